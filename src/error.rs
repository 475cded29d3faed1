use crate::model::{LeagueId, UserId};

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The remote match-data provider failed or timed out. Aborts the
    /// current cycle without advancing the cursor; safe to retry next cycle.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// No unused team left for this participant in the current half-season
    /// window. The caller skips the participant for the cycle.
    #[error("no assignable team for user {user_id} in league {league_id}, matchday {matchday}")]
    AssignmentExhausted {
        user_id: UserId,
        league_id: LeagueId,
        matchday: u32,
    },

    /// A concurrent writer won a race on an idempotency guard. Benign.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Transient failures are worth retrying within the same cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::ProviderUnavailable(_))
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::ProviderUnavailable(err.to_string())
    }
}
