use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;
use crate::model::{Match, Team};

pub mod football_data;
pub mod replay;
pub mod retry;

#[derive(Clone, Copy, Debug)]
pub enum ProviderKind {
    FootballData,
    Replay,
}

impl ProviderKind {
    pub fn from_env() -> Self {
        match std::env::var("PROVIDER").unwrap_or_else(|_| "football-data".to_string()).as_str() {
            "replay" => ProviderKind::Replay,
            _ => ProviderKind::FootballData,
        }
    }

    pub fn build(self, cfg: &Config) -> Result<Box<dyn MatchDataProvider>> {
        match self {
            ProviderKind::FootballData => {
                Ok(Box::new(football_data::FootballData::new(cfg)?))
            }
            ProviderKind::Replay => Ok(Box::new(replay::ReplayProvider::from_env()?)),
        }
    }
}

/// Remote source of matchdays and results. Failures surface as
/// `EngineError::ProviderUnavailable`; the cycle aborts and retries later.
#[async_trait]
pub trait MatchDataProvider: Send + Sync {
    async fn current_matchday(&self) -> Result<u32>;
    async fn matchday_results(&self, matchday: u32) -> Result<Vec<Match>>;
    /// Competition team catalog, used once at bootstrap.
    async fn teams(&self) -> Result<Vec<Team>>;
}
