#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the football-data API.
    pub api_base: String,
    /// Competition code in the API path, e.g. "PL".
    pub competition: String,
    pub api_token: Option<String>,
    pub sqlite_path: String,
    /// Seconds between cycles in the long-running loop.
    pub poll_secs: u64,
    /// Per-request timeout for provider calls.
    pub provider_timeout_ms: u64,
    pub retry_max: u32,
    pub retry_base_delay_ms: u64,
    /// Concurrent users scored at once within one league.
    pub user_fanout: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("API_BASE")
                .unwrap_or_else(|_| "https://api.football-data.org".to_string()),
            competition: std::env::var("COMPETITION").unwrap_or_else(|_| "PL".to_string()),
            api_token: std::env::var("API_TOKEN").ok(),
            sqlite_path: std::env::var("SQLITE_PATH").unwrap_or_else(|_| "./survivorpool.sqlite".to_string()),
            poll_secs: std::env::var("POLL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(3600),
            provider_timeout_ms: std::env::var("PROVIDER_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(10_000),
            retry_max: std::env::var("RETRY_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(3),
            retry_base_delay_ms: std::env::var("RETRY_BASE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(200),
            user_fanout: std::env::var("USER_FANOUT").ok().and_then(|v| v.parse().ok()).unwrap_or(8),
        }
    }
}
