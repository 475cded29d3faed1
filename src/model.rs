use std::ops::Range;

use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type LeagueId = String;
pub type TeamId = String;

/// Lives every participant starts a league with.
pub const STARTING_LIVES: i64 = 3;

/// First matchday of the second half-season pick-uniqueness window.
pub const HALF_SEASON_BOUNDARY: u32 = 21;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Scheduled,
    InPlay,
    Finished,
}

impl MatchStatus {
    /// Provider status strings collapse onto the three states scoring
    /// cares about; anything unknown is treated as not yet started.
    pub fn parse(s: &str) -> Self {
        match s {
            "FINISHED" => MatchStatus::Finished,
            "IN_PLAY" | "PAUSED" => MatchStatus::InPlay,
            _ => MatchStatus::Scheduled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::InPlay => "IN_PLAY",
            MatchStatus::Finished => "FINISHED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    HomeTeam,
    AwayTeam,
    Draw,
}

impl Winner {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HOME_TEAM" => Some(Winner::HomeTeam),
            "AWAY_TEAM" => Some(Winner::AwayTeam),
            "DRAW" => Some(Winner::Draw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::HomeTeam => "HOME_TEAM",
            Winner::AwayTeam => "AWAY_TEAM",
            Winner::Draw => "DRAW",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: u64,
    pub matchday: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub winner: Option<Winner>,
    pub status: MatchStatus,
    /// Kickoff as epoch seconds UTC; `None` when the upstream date
    /// was missing or unparseable.
    #[serde(default)]
    pub kickoff_ts: Option<u64>,
}

impl Match {
    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }
}

#[derive(Debug, Clone)]
pub struct League {
    pub id: LeagueId,
    pub members: Vec<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Default,
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn parse(s: &str) -> Self {
        match s {
            "CORRECT" => Outcome::Correct,
            "INCORRECT" => Outcome::Incorrect,
            _ => Outcome::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Default => "DEFAULT",
            Outcome::Correct => "CORRECT",
            Outcome::Incorrect => "INCORRECT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub user_id: UserId,
    pub league_id: LeagueId,
    pub matchday: u32,
    pub team_id: TeamId,
    pub outcome: Outcome,
    pub created_ts: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct UserLeagueState {
    pub lives: i64,
    pub last_matchday_updated: u32,
}

impl UserLeagueState {
    pub fn fresh() -> Self {
        Self { lives: STARTING_LIVES, last_matchday_updated: 0 }
    }
}

/// The half-season window a matchday belongs to. A team may be picked at
/// most once per window.
pub fn half_season_window(matchday: u32) -> Range<u32> {
    if matchday < HALF_SEASON_BOUNDARY {
        1..HALF_SEASON_BOUNDARY
    } else {
        HALF_SEASON_BOUNDARY..u32::MAX
    }
}

pub fn now_ts() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_windows_split_at_21() {
        assert_eq!(half_season_window(1), 1..21);
        assert_eq!(half_season_window(20), 1..21);
        assert_eq!(half_season_window(21), 21..u32::MAX);
        assert_eq!(half_season_window(38), 21..u32::MAX);
    }

    #[test]
    fn status_parse_collapses_unknowns() {
        assert_eq!(MatchStatus::parse("FINISHED"), MatchStatus::Finished);
        assert_eq!(MatchStatus::parse("PAUSED"), MatchStatus::InPlay);
        assert_eq!(MatchStatus::parse("TIMED"), MatchStatus::Scheduled);
        assert_eq!(MatchStatus::parse("POSTPONED"), MatchStatus::Scheduled);
    }

    #[test]
    fn winner_parse_round_trips() {
        for w in [Winner::HomeTeam, Winner::AwayTeam, Winner::Draw] {
            assert_eq!(Winner::parse(w.as_str()), Some(w));
        }
        assert_eq!(Winner::parse(""), None);
    }

    #[test]
    fn fresh_state_has_three_lives() {
        let s = UserLeagueState::fresh();
        assert_eq!(s.lives, 3);
        assert_eq!(s.last_matchday_updated, 0);
    }
}
