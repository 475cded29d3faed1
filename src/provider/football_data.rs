use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::model::{Match, MatchStatus, Team, Winner};
use crate::provider::MatchDataProvider;

/// Client for the football-data.org v4 API.
pub struct FootballData {
    client: Client,
    base: String,
    competition: String,
    api_token: Option<String>,
}

impl FootballData {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.provider_timeout_ms))
            .build()
            .map_err(|e| EngineError::ProviderUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            base: cfg.api_base.clone(),
            competition: cfg.competition.clone(),
            api_token: cfg.api_token.clone(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url);
        if let Some(token) = &self.api_token {
            req = req.header("X-Auth-Token", token);
        }
        req
    }
}

#[derive(Deserialize, Debug)]
struct CompetitionResponse {
    #[serde(rename = "currentSeason")]
    current_season: CurrentSeason,
}

#[derive(Deserialize, Debug)]
struct CurrentSeason {
    #[serde(rename = "currentMatchday")]
    current_matchday: u32,
}

#[derive(Deserialize, Debug)]
struct MatchesResponse {
    matches: Vec<ApiMatch>,
}

#[derive(Deserialize, Debug)]
struct ApiMatch {
    id: u64,
    matchday: u32,
    #[serde(rename = "homeTeam")]
    home_team: ApiTeam,
    #[serde(rename = "awayTeam")]
    away_team: ApiTeam,
    score: ApiScore,
    status: String,
    #[serde(rename = "utcDate")]
    utc_date: String,
}

#[derive(Deserialize, Debug)]
struct ApiTeam {
    name: String,
}

#[derive(Deserialize, Debug)]
struct ApiScore {
    winner: Option<String>,
    #[serde(rename = "fullTime")]
    full_time: ApiFullTime,
}

#[derive(Deserialize, Debug, Default)]
struct ApiFullTime {
    home: Option<i64>,
    away: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct TeamsResponse {
    teams: Vec<ApiCatalogTeam>,
}

#[derive(Deserialize, Debug)]
struct ApiCatalogTeam {
    name: String,
}

impl ApiCatalogTeam {
    // Predictions and fixtures key teams by name, so the name doubles
    // as the catalog id.
    fn into_team(self) -> Team {
        Team { id: self.name.clone(), name: self.name }
    }
}

impl ApiMatch {
    fn into_match(self) -> Match {
        // An unparseable date must not count as a kickoff deadline,
        // otherwise the matchday would lock immediately.
        let kickoff_ts = DateTime::parse_from_rfc3339(&self.utc_date)
            .ok()
            .map(|dt| dt.timestamp().max(0) as u64);
        Match {
            id: self.id,
            matchday: self.matchday,
            home_team: self.home_team.name,
            away_team: self.away_team.name,
            home_score: self.score.full_time.home,
            away_score: self.score.full_time.away,
            winner: self.score.winner.as_deref().and_then(Winner::parse),
            status: MatchStatus::parse(&self.status),
            kickoff_ts,
        }
    }
}

#[async_trait]
impl MatchDataProvider for FootballData {
    async fn current_matchday(&self) -> Result<u32> {
        let url = format!("{}/v4/competitions/{}", self.base, self.competition);
        let resp = self.get(&url).send().await?.error_for_status()?;
        let body: CompetitionResponse = resp.json().await?;
        Ok(body.current_season.current_matchday)
    }

    async fn matchday_results(&self, matchday: u32) -> Result<Vec<Match>> {
        let url = format!(
            "{}/v4/competitions/{}/matches?matchday={}",
            self.base, self.competition, matchday
        );
        let resp = self.get(&url).send().await?.error_for_status()?;
        let body: MatchesResponse = resp.json().await?;
        Ok(body.matches.into_iter().map(ApiMatch::into_match).collect())
    }

    async fn teams(&self) -> Result<Vec<Team>> {
        let url = format!("{}/v4/competitions/{}/teams", self.base, self.competition);
        let resp = self.get(&url).send().await?.error_for_status()?;
        let body: TeamsResponse = resp.json().await?;
        Ok(body.teams.into_iter().map(ApiCatalogTeam::into_team).collect())
    }
}
