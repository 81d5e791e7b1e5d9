use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Engine configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Redis connection URL for the persistence store
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Region for provider availability filters (ISO 3166-1)
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    /// Base seed for the session's deterministic generators.
    /// When unset, derived from the clock at startup.
    #[serde(default)]
    pub feed_seed: Option<u64>,

    /// Whether taste counters are persisted across restarts.
    /// Defaults to false: taste is per-session unless opted in.
    #[serde(default)]
    pub persist_taste: bool,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_watch_region() -> String {
    "US".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// The base seed for this process: configured value, or clock-derived
    pub fn base_seed(&self) -> u64 {
        self.feed_seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(1)
        })
    }
}
