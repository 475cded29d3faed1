//! Per-cycle counters. One instance lives for the duration of a cycle and is
//! snapshotted into the log at the end.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::logging::{log, obj, v_num, Domain, Level};

#[derive(Debug, Default)]
pub struct CycleMetrics {
    pub assigned: AtomicU64,
    pub exhausted: AtomicU64,
    pub correct: AtomicU64,
    pub incorrect: AtomicU64,
    pub pending: AtomicU64,
    pub already_scored: AtomicU64,
    pub skipped_users: AtomicU64,
    pub provider_retries: AtomicU64,
}

impl CycleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn emit(&self, matchday: u32) {
        log(
            Level::Info,
            Domain::Metrics,
            "cycle_counters",
            obj(&[
                ("matchday", v_num(matchday)),
                ("assigned", v_num(self.assigned.load(Ordering::Relaxed) as u32)),
                ("exhausted", v_num(self.exhausted.load(Ordering::Relaxed) as u32)),
                ("correct", v_num(self.correct.load(Ordering::Relaxed) as u32)),
                ("incorrect", v_num(self.incorrect.load(Ordering::Relaxed) as u32)),
                ("pending", v_num(self.pending.load(Ordering::Relaxed) as u32)),
                ("already_scored", v_num(self.already_scored.load(Ordering::Relaxed) as u32)),
                ("skipped_users", v_num(self.skipped_users.load(Ordering::Relaxed) as u32)),
                ("provider_retries", v_num(self.provider_retries.load(Ordering::Relaxed) as u32)),
            ]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_bump() {
        let m = CycleMetrics::new();
        assert_eq!(m.correct.load(Ordering::Relaxed), 0);
        CycleMetrics::bump(&m.correct);
        CycleMetrics::bump(&m.correct);
        assert_eq!(m.correct.load(Ordering::Relaxed), 2);
    }
}
