//! Scores one matchday against every participant's pick and mutates life
//! counts. `last_matchday_updated` is the idempotency guard: re-running
//! `score` for the same matchday is a no-op.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};

use crate::engine::assignment::AssignmentEngine;
use crate::error::{EngineError, Result};
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::metrics::CycleMetrics;
use crate::model::{Match, MatchStatus, Outcome, Prediction, Winner};
use crate::store::Store;

pub struct ScoringEngine {
    store: Arc<dyn Store>,
    user_fanout: usize,
}

impl ScoringEngine {
    pub fn new(store: Arc<dyn Store>, user_fanout: usize) -> Self {
        Self { store, user_fanout: user_fanout.max(1) }
    }

    /// Score every league member for `matchday`. A failure on one user or
    /// one league is logged and counted, never propagated to siblings.
    pub async fn score(&self, matchday: u32, metrics: &CycleMetrics) -> Result<()> {
        let matches = self.store.matches_for_matchday(matchday)?;
        for league in self.store.leagues()? {
            log(
                Level::Debug,
                Domain::Scoring,
                "league_start",
                obj(&[
                    ("league", v_str(&league.id)),
                    ("members", v_num(league.members.len() as u32)),
                    ("matchday", v_num(matchday)),
                ]),
            );
            stream::iter(league.members.iter())
                .for_each_concurrent(self.user_fanout, |user_id| {
                    let league_id = league.id.clone();
                    let matches = &matches;
                    async move {
                        if let Err(err) = self.score_user(user_id, &league_id, matchday, matches, metrics) {
                            CycleMetrics::bump(&metrics.skipped_users);
                            log(
                                Level::Error,
                                Domain::Scoring,
                                "user_failed",
                                obj(&[
                                    ("user", v_str(user_id)),
                                    ("league", v_str(&league_id)),
                                    ("matchday", v_num(matchday)),
                                    ("error", v_str(&err.to_string())),
                                ]),
                            );
                        }
                    }
                })
                .await;
        }
        Ok(())
    }

    fn score_user(
        &self,
        user_id: &str,
        league_id: &str,
        matchday: u32,
        matches: &[Match],
        metrics: &CycleMetrics,
    ) -> Result<()> {
        let store = self.store.as_ref();
        let state = store.ensure_user_league_state(user_id, league_id)?;

        let prediction = match store.prediction(user_id, league_id, matchday)? {
            Some(p) => p,
            None => match AssignmentEngine::new(store).assign(user_id, league_id, matchday) {
                Ok(p) => {
                    CycleMetrics::bump(&metrics.assigned);
                    p
                }
                Err(EngineError::AssignmentExhausted { .. }) => {
                    CycleMetrics::bump(&metrics.exhausted);
                    log(
                        Level::Warn,
                        Domain::Assign,
                        "exhausted",
                        obj(&[
                            ("user", v_str(user_id)),
                            ("league", v_str(league_id)),
                            ("matchday", v_num(matchday)),
                        ]),
                    );
                    return Ok(());
                }
                Err(err) => return Err(err),
            },
        };

        // Already scored for this matchday (or a later one): nothing to do.
        if state.last_matchday_updated >= matchday {
            CycleMetrics::bump(&metrics.already_scored);
            return Ok(());
        }

        self.evaluate(&prediction, matchday, matches, metrics)
    }

    fn evaluate(
        &self,
        prediction: &Prediction,
        matchday: u32,
        matches: &[Match],
        metrics: &CycleMetrics,
    ) -> Result<()> {
        let store = self.store.as_ref();
        // A team appears in at most one match per matchday.
        let matched = matches.iter().find(|m| m.involves(&prediction.team_id));

        let outcome = match matched {
            Some(m) if m.status == MatchStatus::Finished => match m.winner {
                Some(Winner::Draw) => Outcome::Correct,
                Some(Winner::HomeTeam) if m.home_team == prediction.team_id => Outcome::Correct,
                Some(Winner::AwayTeam) if m.away_team == prediction.team_id => Outcome::Correct,
                Some(_) => Outcome::Incorrect,
                // Finished without a winner is a provider inconsistency;
                // leave the pick pending and re-evaluate next cycle.
                None => Outcome::Default,
            },
            // Not finished yet, or the predicted team has no fixture in the
            // stored set: re-evaluate on a future cycle.
            _ => Outcome::Default,
        };

        if outcome == Outcome::Default {
            CycleMetrics::bump(&metrics.pending);
            store.set_prediction_outcome(
                &prediction.user_id,
                &prediction.league_id,
                matchday,
                Outcome::Default,
            )?;
            return Ok(());
        }

        let lose_life = outcome == Outcome::Incorrect;
        let applied = store.apply_matchday_result(
            &prediction.user_id,
            &prediction.league_id,
            matchday,
            lose_life,
        )?;

        if applied {
            match outcome {
                Outcome::Correct => CycleMetrics::bump(&metrics.correct),
                Outcome::Incorrect => CycleMetrics::bump(&metrics.incorrect),
                Outcome::Default => {}
            }
            log(
                Level::Info,
                Domain::Scoring,
                "scored",
                obj(&[
                    ("user", v_str(&prediction.user_id)),
                    ("league", v_str(&prediction.league_id)),
                    ("matchday", v_num(matchday)),
                    ("team", v_str(&prediction.team_id)),
                    ("outcome", v_str(outcome.as_str())),
                    ("lost_life", v_str(if lose_life { "true" } else { "false" })),
                ]),
            );
        } else {
            // A concurrent cycle already applied this matchday. Benign.
            CycleMetrics::bump(&metrics.already_scored);
            log(
                Level::Debug,
                Domain::Scoring,
                "guard_conflict",
                obj(&[
                    ("user", v_str(&prediction.user_id)),
                    ("league", v_str(&prediction.league_id)),
                    ("matchday", v_num(matchday)),
                ]),
            );
        }

        // The outcome write is idempotent: any writer computes the same
        // value from the same finished match.
        store.set_prediction_outcome(
            &prediction.user_id,
            &prediction.league_id,
            matchday,
            outcome,
        )?;
        Ok(())
    }
}
