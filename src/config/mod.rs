//! Client configuration (code > environment > defaults).

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const ENV_BASE_URL: &str = "TRANSITOPS_API_BASE_URL";
const ENV_TIMEOUT_MS: &str = "TRANSITOPS_API_TIMEOUT_MS";

/// Transport-level configuration for [`ApiClient`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use transitops::config::ApiConfig;
///
/// let config = ApiConfig::new("https://ops.transit.example/api")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.endpoint("/routes"), "https://ops.transit.example/api/routes");
/// ```
///
/// [`ApiClient`]: crate::client::ApiClient
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Read configuration from the environment (`.env` honored), falling
    /// back to compiled-in defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_ms = std::env::var(ENV_TIMEOUT_MS)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        Self {
            base_url: normalize_base_url(base_url),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}
