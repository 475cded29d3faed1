//! File-backed provider for offline runs and demos. The fixture file holds
//! the current matchday plus its matches in the engine's own match shape:
//!
//! ```json
//! {"current_matchday": 5, "matches": [...], "teams": [...]}
//! ```

use async_trait::async_trait;

use anyhow::Context;

use crate::error::Result;
use crate::model::{Match, Team};
use crate::provider::MatchDataProvider;

pub struct ReplayProvider {
    fixture: Fixture,
}

#[derive(serde::Deserialize)]
struct Fixture {
    current_matchday: u32,
    matches: Vec<Match>,
    #[serde(default)]
    teams: Vec<Team>,
}

impl ReplayProvider {
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("REPLAY_FILE").unwrap_or_else(|_| "./fixture.json".to_string());
        Self::from_file(&path)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading replay fixture {}", path))?;
        let fixture: Fixture =
            serde_json::from_str(&raw).with_context(|| format!("parsing replay fixture {}", path))?;
        Ok(Self { fixture })
    }
}

#[async_trait]
impl MatchDataProvider for ReplayProvider {
    async fn current_matchday(&self) -> Result<u32> {
        Ok(self.fixture.current_matchday)
    }

    async fn matchday_results(&self, matchday: u32) -> Result<Vec<Match>> {
        Ok(self
            .fixture
            .matches
            .iter()
            .filter(|m| m.matchday == matchday)
            .cloned()
            .collect())
    }

    async fn teams(&self) -> Result<Vec<Team>> {
        Ok(self.fixture.teams.clone())
    }
}
