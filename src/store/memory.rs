//! HashMap-backed store. Stands in for sqlite in tests and offline runs;
//! the atomic primitives keep the same semantics as the SQL statements.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Mutex;

use crate::error::Result;
use crate::model::{League, Match, Outcome, Prediction, Team, UserLeagueState};
use crate::store::Store;

#[derive(Default)]
struct Inner {
    matches: BTreeMap<u64, Match>,
    leagues: BTreeMap<String, League>,
    // keyed (user, league, matchday)
    predictions: BTreeMap<(String, String, u32), Prediction>,
    // keyed (user, league)
    states: BTreeMap<(String, String), UserLeagueState>,
    cursor: Option<u32>,
    teams: BTreeMap<String, Team>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_league(&self, league: League) {
        let mut inner = self.inner.lock().expect("store lock");
        inner.leagues.insert(league.id.clone(), league);
    }

    /// Test helper: place a prediction directly, as the external submission
    /// endpoint would.
    pub fn put_prediction(&self, p: Prediction) {
        let mut inner = self.inner.lock().expect("store lock");
        inner
            .predictions
            .insert((p.user_id.clone(), p.league_id.clone(), p.matchday), p);
    }

    pub fn all_matches(&self) -> Vec<Match> {
        let inner = self.inner.lock().expect("store lock");
        inner.matches.values().cloned().collect()
    }
}

impl Store for MemoryStore {
    fn upsert_matches(&self, matches: &[Match]) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock");
        for m in matches {
            inner.matches.insert(m.id, m.clone());
        }
        Ok(())
    }

    fn matches_for_matchday(&self, matchday: u32) -> Result<Vec<Match>> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner
            .matches
            .values()
            .filter(|m| m.matchday == matchday)
            .cloned()
            .collect())
    }

    fn delete_finished_matches(&self) -> Result<u64> {
        let mut inner = self.inner.lock().expect("store lock");
        let before = inner.matches.len();
        inner
            .matches
            .retain(|_, m| m.status != crate::model::MatchStatus::Finished);
        Ok((before - inner.matches.len()) as u64)
    }

    fn leagues(&self) -> Result<Vec<League>> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner.leagues.values().cloned().collect())
    }

    fn prediction(&self, user_id: &str, league_id: &str, matchday: u32) -> Result<Option<Prediction>> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner
            .predictions
            .get(&(user_id.to_string(), league_id.to_string(), matchday))
            .cloned())
    }

    fn predicted_teams_in_window(
        &self,
        user_id: &str,
        league_id: &str,
        window: Range<u32>,
    ) -> Result<Vec<String>> {
        let inner = self.inner.lock().expect("store lock");
        let mut teams: Vec<String> = inner
            .predictions
            .values()
            .filter(|p| {
                p.user_id == user_id && p.league_id == league_id && window.contains(&p.matchday)
            })
            .map(|p| p.team_id.clone())
            .collect();
        teams.sort();
        teams.dedup();
        Ok(teams)
    }

    fn insert_prediction_if_absent(&self, p: &Prediction) -> Result<bool> {
        let mut inner = self.inner.lock().expect("store lock");
        let key = (p.user_id.clone(), p.league_id.clone(), p.matchday);
        if inner.predictions.contains_key(&key) {
            return Ok(false);
        }
        inner.predictions.insert(key, p.clone());
        Ok(true)
    }

    fn set_prediction_outcome(
        &self,
        user_id: &str,
        league_id: &str,
        matchday: u32,
        outcome: Outcome,
    ) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock");
        if let Some(p) = inner
            .predictions
            .get_mut(&(user_id.to_string(), league_id.to_string(), matchday))
        {
            p.outcome = outcome;
        }
        Ok(())
    }

    fn ensure_user_league_state(&self, user_id: &str, league_id: &str) -> Result<UserLeagueState> {
        let mut inner = self.inner.lock().expect("store lock");
        let state = inner
            .states
            .entry((user_id.to_string(), league_id.to_string()))
            .or_insert_with(UserLeagueState::fresh);
        Ok(*state)
    }

    fn user_league_state(&self, user_id: &str, league_id: &str) -> Result<Option<UserLeagueState>> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner
            .states
            .get(&(user_id.to_string(), league_id.to_string()))
            .copied())
    }

    fn apply_matchday_result(
        &self,
        user_id: &str,
        league_id: &str,
        matchday: u32,
        lose_life: bool,
    ) -> Result<bool> {
        let mut inner = self.inner.lock().expect("store lock");
        match inner
            .states
            .get_mut(&(user_id.to_string(), league_id.to_string()))
        {
            Some(state) if state.last_matchday_updated < matchday => {
                if lose_life {
                    state.lives -= 1;
                }
                state.last_matchday_updated = matchday;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn cursor(&self) -> Result<u32> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner.cursor.unwrap_or(1))
    }

    fn set_cursor(&self, matchday: u32) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock");
        inner.cursor = Some(matchday);
        Ok(())
    }

    fn teams(&self) -> Result<Vec<Team>> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner.teams.values().cloned().collect())
    }

    fn seed_teams(&self, teams: &[Team]) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock");
        for t in teams {
            inner.teams.entry(t.id.clone()).or_insert_with(|| t.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::now_ts;

    fn pred(user: &str, league: &str, matchday: u32, team: &str) -> Prediction {
        Prediction {
            user_id: user.to_string(),
            league_id: league.to_string(),
            matchday,
            team_id: team.to_string(),
            outcome: Outcome::Default,
            created_ts: now_ts(),
        }
    }

    #[test]
    fn insert_if_absent_is_check_then_create() {
        let store = MemoryStore::new();
        assert!(store.insert_prediction_if_absent(&pred("u1", "l1", 3, "Arsenal FC")).unwrap());
        assert!(!store.insert_prediction_if_absent(&pred("u1", "l1", 3, "Chelsea FC")).unwrap());
        // the loser's row did not overwrite the winner's
        let kept = store.prediction("u1", "l1", 3).unwrap().unwrap();
        assert_eq!(kept.team_id, "Arsenal FC");
    }

    #[test]
    fn conditional_update_noops_once_guard_passed() {
        let store = MemoryStore::new();
        store.ensure_user_league_state("u1", "l1").unwrap();
        assert!(store.apply_matchday_result("u1", "l1", 5, true).unwrap());
        assert!(!store.apply_matchday_result("u1", "l1", 5, true).unwrap());
        let state = store.user_league_state("u1", "l1").unwrap().unwrap();
        assert_eq!(state.lives, 2);
        assert_eq!(state.last_matchday_updated, 5);
    }

    #[test]
    fn cursor_defaults_to_one() {
        let store = MemoryStore::new();
        assert_eq!(store.cursor().unwrap(), 1);
        store.set_cursor(7).unwrap();
        assert_eq!(store.cursor().unwrap(), 7);
    }

    #[test]
    fn window_query_dedups_and_sorts() {
        let store = MemoryStore::new();
        store.put_prediction(pred("u1", "l1", 2, "Chelsea FC"));
        store.put_prediction(pred("u1", "l1", 4, "Arsenal FC"));
        store.put_prediction(pred("u1", "l1", 25, "Everton FC")); // other window
        let teams = store.predicted_teams_in_window("u1", "l1", 1..21).unwrap();
        assert_eq!(teams, vec!["Arsenal FC".to_string(), "Chelsea FC".to_string()]);
    }
}
