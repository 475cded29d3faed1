//! Evicts finished matches once a cycle has scored them. Ordering matters:
//! scoring reads match status, so cleanup must run after it within a cycle.

use std::sync::Arc;

use crate::error::Result;
use crate::logging::{log, obj, v_num, Domain, Level};
use crate::store::Store;

pub struct CleanupService {
    store: Arc<dyn Store>,
}

impl CleanupService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn cleanup(&self) -> Result<u64> {
        let removed = self.store.delete_finished_matches()?;
        if removed > 0 {
            log(
                Level::Info,
                Domain::Cleanup,
                "finished_matches_removed",
                obj(&[("count", v_num(removed as u32))]),
            );
        }
        Ok(removed)
    }
}
