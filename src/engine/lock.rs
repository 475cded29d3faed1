//! Pick-lock predicate: a matchday closes to edits once its first match
//! kicks off. Auto-assignment and scoring only run on locked matchdays.

use crate::error::Result;
use crate::model::now_ts;
use crate::store::Store;

pub struct LockPolicy<'a> {
    store: &'a dyn Store,
}

impl<'a> LockPolicy<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub fn is_locked(&self, matchday: u32) -> Result<bool> {
        self.is_locked_at(matchday, now_ts())
    }

    /// Locked once `now` reaches the earliest kickoff of the matchday.
    /// Matches with an unknown kickoff are skipped; with no known kickoff
    /// at all the deadline is indeterminate; treated as not locked so
    /// nothing gets auto-assigned.
    pub fn is_locked_at(&self, matchday: u32, now: u64) -> Result<bool> {
        let earliest = self
            .store
            .matches_for_matchday(matchday)?
            .iter()
            .filter_map(|m| m.kickoff_ts)
            .min();
        Ok(match earliest {
            Some(kickoff) => now >= kickoff,
            None => false,
        })
    }
}
