//! Client configuration.
//!
//! The transport collaborator owns exactly two knobs: where the remote
//! store lives and how long a request may take. Defaults point at the
//! local dev server; the environment overrides them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default remote store endpoint (the local dev server).
const DEFAULT_BASE_URL: &str = "http://localhost:3002";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the base URL.
const ENV_BASE_URL: &str = "CARTCACHE_API_URL";

/// Environment variable overriding the request timeout.
const ENV_TIMEOUT_SECS: &str = "CARTCACHE_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    /// A `.env` file is honored if present (silently ignored if not).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = secs
                .parse()
                .with_context(|| format!("invalid {}: {}", ENV_TIMEOUT_SECS, secs))?;
        }
        Ok(config)
    }
}
