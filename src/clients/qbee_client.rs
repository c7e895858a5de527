//! qbee.io API client module
//!
//! Encapsulates the configuration endpoints used for software management
//! deployment: reading a group's configuration, posting a change and
//! committing it.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::core::config::AppConfig;
use crate::core::models::{RemoteConfig, SOFTWARE_MANAGEMENT, SoftwareManagement};
use crate::errors::SmError;

const CHANGE_API: &str = "change";
const COMMIT_API: &str = "commit";
const CONFIG_API: &str = "config/";

/// Operations the deployment flow needs from the configuration API.
#[async_trait]
pub trait ConfigApi: Send + Sync {
    /// Fetches the current configuration of a device group.
    async fn get_current_config(&self, group: &str) -> Result<RemoteConfig, SmError>;

    /// Posts `config` as the group's software management bundle and commits it.
    async fn send_config(
        &self,
        group: &str,
        config: &SoftwareManagement,
        commit_message: &str,
    ) -> Result<(), SmError>;
}

/// HTTP client for the qbee.io v2 API with bearer authentication
pub struct QbeeClient {
    http: Client,
    api_url: String,
    retry_attempts: usize,
}

impl QbeeClient {
    /// # Errors
    ///
    /// Returns an error if the token cannot be used as a header value or the
    /// HTTP client cannot be built.
    pub fn new(token: &str, config: &AppConfig) -> Result<Self, SmError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            SmError::InputError("token contains characters not allowed in a header".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            retry_attempts: config.retry_attempts,
        })
    }

    #[must_use]
    pub fn config_url(&self, group: &str) -> String {
        format!("{}{CONFIG_API}{}", self.api_url, urlencoding::encode(group))
    }

    #[must_use]
    pub fn change_url(&self) -> String {
        format!("{}{CHANGE_API}", self.api_url)
    }

    #[must_use]
    pub fn commit_url(&self) -> String {
        format!("{}{COMMIT_API}", self.api_url)
    }

    async fn fetch_config_once(&self, group: &str) -> Result<Value, SmError> {
        let response = self.http.get(self.config_url(group)).send().await?;
        check_response(response).await
    }

    async fn post_form(&self, url: String, form: &[(&str, &str)]) -> Result<Value, SmError> {
        let response = self.http.post(url).form(form).send().await?;
        check_response(response).await
    }
}

#[async_trait]
impl ConfigApi for QbeeClient {
    async fn get_current_config(&self, group: &str) -> Result<RemoteConfig, SmError> {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.retry_attempts);

        let body = RetryIf::spawn(
            strategy,
            || self.fetch_config_once(group),
            |e: &SmError| {
                let retry = is_transient(e);
                if retry {
                    warn!("Fetching current config failed, retrying: {}", e);
                }
                retry
            },
        )
        .await?;

        debug!("Current config for {}: {}", group, body);

        serde_json::from_value(body)
            .map_err(|e| SmError::UnexpectedResponse(format!("current config: {e}")))
    }

    async fn send_config(
        &self,
        group: &str,
        config: &SoftwareManagement,
        commit_message: &str,
    ) -> Result<(), SmError> {
        let config_json = config.to_json_string()?;

        info!("posting new config");
        let change = [
            ("node_id", group),
            ("config", config_json.as_str()),
            ("formtype", SOFTWARE_MANAGEMENT),
        ];
        let body = self.post_form(self.change_url(), &change).await?;
        info!("success: {}", body);

        info!("committing new config");
        let commit = [("action", "commit"), ("message", commit_message)];
        let body = self.post_form(self.commit_url(), &commit).await?;
        info!("success: {}", body);

        Ok(())
    }
}

/// Turns any non-200 response into [`SmError::ApiError`], keeping the body.
async fn check_response(response: Response) -> Result<Value, SmError> {
    let status = response.status();
    let text = response.text().await?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    if status != StatusCode::OK {
        debug!("API call failed ({}): {}", status, body);
        return Err(SmError::ApiError {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

fn is_transient(error: &SmError) -> bool {
    match error {
        SmError::HttpError(_) => true,
        SmError::ApiError { status, .. } => *status >= 500,
        _ => false,
    }
}
