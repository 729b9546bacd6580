// Client Configuration
//
// Connection settings for the REST backend, loaded from environment variables
// or set with the builder methods.

use std::env;
use std::time::Duration;

/// Base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Connection settings for [`crate::Client`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, including the version prefix (e.g. `http://host/api/v1`)
    pub base_url: String,

    /// Per-request timeout; no timeout when unset
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `MISEVENTOS_API_URL`: API root (default: http://127.0.0.1:8000/api/v1)
    /// - `MISEVENTOS_TIMEOUT_SECS`: request timeout in seconds (default: none)
    pub fn from_env() -> Self {
        let base_url = env::var("MISEVENTOS_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = env::var("MISEVENTOS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| match v.trim().parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    tracing::warn!(value = %v, "Ignoring invalid MISEVENTOS_TIMEOUT_SECS");
                    None
                }
            })
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self { base_url, timeout }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
