//! Runs exactly one cycle and exits; the entrypoint an external scheduler
//! calls instead of the polling loop.

use std::sync::Arc;

use anyhow::Result;

use survivorpool::config::Config;
use survivorpool::engine::lifecycle::LifecycleCoordinator;
use survivorpool::provider::ProviderKind;
use survivorpool::store::sqlite::SqliteStore;
use survivorpool::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&cfg.sqlite_path)?);
    let provider = ProviderKind::from_env().build(&cfg)?;
    let coordinator = LifecycleCoordinator::new(store, provider, &cfg);

    let report = coordinator.run_cycle().await?;
    println!(
        "matchday {}: fetched {} matches, scored={}, removed {}, cursor_advanced={}",
        report.matchday,
        report.matches_fetched,
        report.scored,
        report.matches_removed,
        report.cursor_advanced
    );
    Ok(())
}
