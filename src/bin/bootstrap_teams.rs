//! Seeds the team catalog from the provider when the store is empty.
//! Teams are immutable once seeded, so rerunning is harmless.

use std::sync::Arc;

use anyhow::Result;

use survivorpool::config::Config;
use survivorpool::provider::ProviderKind;
use survivorpool::store::sqlite::SqliteStore;
use survivorpool::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&cfg.sqlite_path)?);

    let existing = store.teams()?;
    if !existing.is_empty() {
        println!("team catalog already seeded ({} teams)", existing.len());
        return Ok(());
    }

    let provider = ProviderKind::from_env().build(&cfg)?;
    let teams = provider.teams().await?;
    store.seed_teams(&teams)?;
    println!("seeded {} teams for {}", teams.len(), cfg.competition);
    Ok(())
}
