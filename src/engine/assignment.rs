//! Auto-fills a missing pick: any team playing this matchday that the user
//! has not already picked in this league within the half-season window.

use std::collections::BTreeSet;

use crate::error::{EngineError, Result};
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::model::{half_season_window, now_ts, Outcome, Prediction};
use crate::store::Store;

pub struct AssignmentEngine<'a> {
    store: &'a dyn Store,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Assign a pick for `(user, league, matchday)`. Returns
    /// `AssignmentExhausted` without touching the store when every eligible
    /// team is already used; the caller skips the user for this cycle.
    pub fn assign(&self, user_id: &str, league_id: &str, matchday: u32) -> Result<Prediction> {
        let mut eligible = BTreeSet::new();
        for m in self.store.matches_for_matchday(matchday)? {
            eligible.insert(m.home_team);
            eligible.insert(m.away_team);
        }

        let used: BTreeSet<String> = self
            .store
            .predicted_teams_in_window(user_id, league_id, half_season_window(matchday))?
            .into_iter()
            .collect();

        // BTreeSet iterates in lexicographic order, so the first unused
        // team is the smallest id. Deterministic on purpose.
        let pick = match eligible.into_iter().find(|team| !used.contains(team)) {
            Some(team) => team,
            None => {
                return Err(EngineError::AssignmentExhausted {
                    user_id: user_id.to_string(),
                    league_id: league_id.to_string(),
                    matchday,
                })
            }
        };

        let prediction = Prediction {
            user_id: user_id.to_string(),
            league_id: league_id.to_string(),
            matchday,
            team_id: pick,
            outcome: Outcome::Default,
            created_ts: now_ts(),
        };

        if self.store.insert_prediction_if_absent(&prediction)? {
            log(
                Level::Info,
                Domain::Assign,
                "assigned",
                obj(&[
                    ("user", v_str(user_id)),
                    ("league", v_str(league_id)),
                    ("matchday", v_num(matchday)),
                    ("team", v_str(&prediction.team_id)),
                ]),
            );
            Ok(prediction)
        } else {
            // A concurrent cycle created the pick first; use the winner's row.
            log(
                Level::Debug,
                Domain::Assign,
                "lost_create_race",
                obj(&[
                    ("user", v_str(user_id)),
                    ("league", v_str(league_id)),
                    ("matchday", v_num(matchday)),
                ]),
            );
            self.store
                .prediction(user_id, league_id, matchday)?
                .ok_or_else(|| EngineError::NotFound {
                    entity: "prediction",
                    id: format!("{}/{}/{}", user_id, league_id, matchday),
                })
        }
    }
}
