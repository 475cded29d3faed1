//! Shared fixtures: match builders and a scripted in-memory provider.

#![allow(dead_code)]

use async_trait::async_trait;

use survivorpool::config::Config;
use survivorpool::error::{EngineError, Result};
use survivorpool::model::{League, Match, MatchStatus, Outcome, Prediction, Team, Winner};
use survivorpool::provider::MatchDataProvider;

pub fn test_config() -> Config {
    Config {
        api_base: "http://unused.invalid".to_string(),
        competition: "PL".to_string(),
        api_token: None,
        sqlite_path: ":memory:".to_string(),
        poll_secs: 3600,
        provider_timeout_ms: 1000,
        retry_max: 0,
        retry_base_delay_ms: 1,
        user_fanout: 4,
    }
}

pub fn finished(id: u64, matchday: u32, home: &str, away: &str, winner: Winner) -> Match {
    Match {
        id,
        matchday,
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_score: Some(match winner {
            Winner::HomeTeam => 2,
            Winner::AwayTeam => 0,
            Winner::Draw => 1,
        }),
        away_score: Some(match winner {
            Winner::HomeTeam => 0,
            Winner::AwayTeam => 2,
            Winner::Draw => 1,
        }),
        winner: Some(winner),
        status: MatchStatus::Finished,
        kickoff_ts: Some(1_000),
    }
}

pub fn scheduled(id: u64, matchday: u32, home: &str, away: &str, kickoff_ts: u64) -> Match {
    Match {
        id,
        matchday,
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_score: None,
        away_score: None,
        winner: None,
        status: MatchStatus::Scheduled,
        kickoff_ts: Some(kickoff_ts),
    }
}

pub fn league(id: &str, members: &[&str]) -> League {
    League {
        id: id.to_string(),
        members: members.iter().map(|m| m.to_string()).collect(),
    }
}

pub fn prediction(user: &str, league: &str, matchday: u32, team: &str) -> Prediction {
    Prediction {
        user_id: user.to_string(),
        league_id: league.to_string(),
        matchday,
        team_id: team.to_string(),
        outcome: Outcome::Default,
        created_ts: 1,
    }
}

/// Provider with canned responses; flips to failure on demand.
pub struct ScriptedProvider {
    pub matchday: u32,
    pub matches: Vec<Match>,
    pub fail: bool,
}

impl ScriptedProvider {
    pub fn new(matchday: u32, matches: Vec<Match>) -> Self {
        Self { matchday, matches, fail: false }
    }

    pub fn failing() -> Self {
        Self { matchday: 0, matches: Vec::new(), fail: true }
    }
}

#[async_trait]
impl MatchDataProvider for ScriptedProvider {
    async fn current_matchday(&self) -> Result<u32> {
        if self.fail {
            return Err(EngineError::ProviderUnavailable("scripted outage".to_string()));
        }
        Ok(self.matchday)
    }

    async fn matchday_results(&self, matchday: u32) -> Result<Vec<Match>> {
        if self.fail {
            return Err(EngineError::ProviderUnavailable("scripted outage".to_string()));
        }
        Ok(self
            .matches
            .iter()
            .filter(|m| m.matchday == matchday)
            .cloned()
            .collect())
    }

    async fn teams(&self) -> Result<Vec<Team>> {
        Ok(Vec::new())
    }
}
