use std::sync::Arc;

use anyhow::Result;
use tokio::time::{sleep, Duration};

use survivorpool::config::Config;
use survivorpool::engine::lifecycle::LifecycleCoordinator;
use survivorpool::logging::{log, obj, v_num, v_str, Domain, Level};
use survivorpool::provider::ProviderKind;
use survivorpool::store::sqlite::SqliteStore;
use survivorpool::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&cfg.sqlite_path)?);
    let provider = ProviderKind::from_env().build(&cfg)?;
    let coordinator = LifecycleCoordinator::new(store, provider, &cfg);

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("competition", v_str(&cfg.competition)),
            ("poll_secs", v_num(cfg.poll_secs as u32)),
            ("sqlite", v_str(&cfg.sqlite_path)),
        ]),
    );

    loop {
        match coordinator.run_cycle().await {
            Ok(report) => {
                if report.cursor_advanced {
                    log(
                        Level::Info,
                        Domain::System,
                        "new_matchday",
                        obj(&[("matchday", v_num(report.matchday))]),
                    );
                }
            }
            // The cycle aborted without advancing the cursor; the next
            // poll retries from the same point.
            Err(err) => {
                log(
                    Level::Error,
                    Domain::System,
                    "cycle_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
            }
        }

        tokio::select! {
            _ = sleep(Duration::from_secs(cfg.poll_secs)) => {}
            _ = tokio::signal::ctrl_c() => {
                log(Level::Info, Domain::System, "shutdown", obj(&[]));
                return Ok(());
            }
        }
    }
}
