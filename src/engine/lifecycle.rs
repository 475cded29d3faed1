//! One end-to-end cycle: fetch the current matchday and its results, persist
//! them, score (once the matchday is locked), evict finished matches, then
//! advance the cursor. Any step failure aborts the rest of the cycle and
//! leaves the cursor untouched; the guards in assignment and scoring make
//! re-running the same matchday a no-op.

use std::sync::Arc;

use crate::config::Config;
use crate::engine::cleanup::CleanupService;
use crate::engine::lock::LockPolicy;
use crate::engine::scoring::ScoringEngine;
use crate::error::Result;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::metrics::CycleMetrics;
use crate::provider::retry::{retry_provider, RetryConfig};
use crate::provider::MatchDataProvider;
use crate::store::Store;

#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    pub matchday: u32,
    pub matches_fetched: usize,
    pub scored: bool,
    pub matches_removed: u64,
    pub cursor_advanced: bool,
}

pub struct LifecycleCoordinator {
    store: Arc<dyn Store>,
    provider: Box<dyn MatchDataProvider>,
    scoring: ScoringEngine,
    cleanup: CleanupService,
    retry: RetryConfig,
}

impl LifecycleCoordinator {
    pub fn new(store: Arc<dyn Store>, provider: Box<dyn MatchDataProvider>, cfg: &Config) -> Self {
        Self {
            scoring: ScoringEngine::new(store.clone(), cfg.user_fanout),
            cleanup: CleanupService::new(store.clone()),
            retry: RetryConfig::from_config(cfg),
            store,
            provider,
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let previous = self.store.cursor()?;
        let metrics = CycleMetrics::new();

        let matchday = retry_provider(&self.retry, "current_matchday", Some(&metrics), || {
            self.provider.current_matchday()
        })
        .await?;
        let results = retry_provider(&self.retry, "matchday_results", Some(&metrics), || {
            self.provider.matchday_results(matchday)
        })
        .await?;
        log(
            Level::Info,
            Domain::Lifecycle,
            "fetched",
            obj(&[
                ("matchday", v_num(matchday)),
                ("previous", v_num(previous)),
                ("matches", v_num(results.len() as u32)),
            ]),
        );

        self.store.upsert_matches(&results)?;

        let locked = LockPolicy::new(self.store.as_ref()).is_locked(matchday)?;
        if locked {
            self.scoring.score(matchday, &metrics).await?;
        } else {
            // Picks are still editable; no auto-assignment, no scoring.
            log(
                Level::Info,
                Domain::Lifecycle,
                "matchday_open",
                obj(&[("matchday", v_num(matchday))]),
            );
        }

        let removed = self.cleanup.cleanup()?;

        let cursor_advanced = matchday != previous;
        if cursor_advanced {
            self.store.set_cursor(matchday)?;
            log(
                Level::Info,
                Domain::Lifecycle,
                "cursor_advanced",
                obj(&[("from", v_num(previous)), ("to", v_num(matchday))]),
            );
        }

        metrics.emit(matchday);
        log(
            Level::Info,
            Domain::Lifecycle,
            "cycle_done",
            obj(&[
                ("matchday", v_num(matchday)),
                ("scored", v_str(if locked { "true" } else { "false" })),
                ("removed", v_num(removed as u32)),
            ]),
        );

        Ok(CycleReport {
            matchday,
            matches_fetched: results.len(),
            scored: locked,
            matches_removed: removed,
            cursor_advanced,
        })
    }
}
