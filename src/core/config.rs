use std::env;
use std::time::Duration;

use url::Url;

use crate::errors::SmError;

pub const DEFAULT_API_URL: &str = "https://www.app.qbee.io/api/v2/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the API, always ending in `/`.
    pub api_url: String,
    pub http_timeout: Duration,
    /// Retries for idempotent requests. Zero disables retrying.
    pub retry_attempts: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, SmError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = match lookup("QBEE_API_URL") {
            Some(raw) => normalize_api_url(&raw)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout_secs = match lookup("QBEE_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(SmError::ConfigError(format!(
                        "QBEE_HTTP_TIMEOUT_SECS: expected a positive integer, got '{raw}'"
                    )));
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let retry_attempts = match lookup("QBEE_RETRY_ATTEMPTS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                SmError::ConfigError(format!("QBEE_RETRY_ATTEMPTS: {e}"))
            })?,
            None => DEFAULT_RETRY_ATTEMPTS,
        };

        Ok(Self {
            api_url,
            http_timeout: Duration::from_secs(timeout_secs),
            retry_attempts,
        })
    }
}

fn normalize_api_url(raw: &str) -> Result<String, SmError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| SmError::ConfigError(format!("QBEE_API_URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SmError::ConfigError(format!(
            "QBEE_API_URL: unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    let mut url = parsed.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}
