use std::path::Path;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmError {
    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to read {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    ParseError(String),

    #[error("Configuration does not match the software management schema: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("error in API call (status {status}): {body}")]
    ApiError { status: u16, body: Value },

    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    #[error("mismatch in current configuration and new configuration: {0}")]
    Mismatch(String),
}

impl SmError {
    pub fn io(path: &Path, error: &std::io::Error) -> Self {
        SmError::IoError {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for SmError {
    fn from(error: reqwest::Error) -> Self {
        SmError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for SmError {
    fn from(error: serde_json::Error) -> Self {
        SmError::ParseError(error.to_string())
    }
}
