//! Persistence seam. Every engine component takes `&dyn Store` (or an
//! `Arc<dyn Store>`) so tests substitute the in-memory implementation.

use std::ops::Range;

use crate::error::Result;
use crate::model::{League, Match, Outcome, Prediction, Team, UserLeagueState};

pub mod memory;
pub mod sqlite;

pub trait Store: Send + Sync {
    // -- matches ----------------------------------------------------------
    /// Insert or overwrite the given matches keyed by id.
    fn upsert_matches(&self, matches: &[Match]) -> Result<()>;
    fn matches_for_matchday(&self, matchday: u32) -> Result<Vec<Match>>;
    /// Evict every FINISHED match; returns how many were removed.
    fn delete_finished_matches(&self) -> Result<u64>;

    // -- leagues (read-only to the engine) --------------------------------
    fn leagues(&self) -> Result<Vec<League>>;

    // -- predictions ------------------------------------------------------
    fn prediction(&self, user_id: &str, league_id: &str, matchday: u32) -> Result<Option<Prediction>>;
    /// Team ids this user has already picked in this league within the
    /// half-season window. Sorted, so the caller's difference stays ordered.
    fn predicted_teams_in_window(
        &self,
        user_id: &str,
        league_id: &str,
        window: Range<u32>,
    ) -> Result<Vec<String>>;
    /// Atomic check-then-create. Returns false when a prediction for the
    /// same (user, league, matchday) already exists; the row is untouched.
    fn insert_prediction_if_absent(&self, prediction: &Prediction) -> Result<bool>;
    fn set_prediction_outcome(
        &self,
        user_id: &str,
        league_id: &str,
        matchday: u32,
        outcome: Outcome,
    ) -> Result<()>;

    // -- per-league participant state -------------------------------------
    /// Lazily create the state row with 3 lives on first touch.
    fn ensure_user_league_state(&self, user_id: &str, league_id: &str) -> Result<UserLeagueState>;
    fn user_league_state(&self, user_id: &str, league_id: &str) -> Result<Option<UserLeagueState>>;
    /// Conditional scoring write: bumps `last_matchday_updated` to `matchday`
    /// (and decrements lives when `lose_life`) only while the stored guard is
    /// still below `matchday`. Returns false when the guard already passed —
    /// a losing concurrent writer observes this as a benign no-op.
    fn apply_matchday_result(
        &self,
        user_id: &str,
        league_id: &str,
        matchday: u32,
        lose_life: bool,
    ) -> Result<bool>;

    // -- matchday cursor ---------------------------------------------------
    /// Last fully processed matchday; 1 when nothing is stored yet.
    fn cursor(&self) -> Result<u32>;
    fn set_cursor(&self, matchday: u32) -> Result<()>;

    // -- team catalog ------------------------------------------------------
    fn teams(&self) -> Result<Vec<Team>>;
    fn seed_teams(&self, teams: &[Team]) -> Result<()>;
}
