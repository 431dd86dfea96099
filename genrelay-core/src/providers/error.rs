//! Backend error types and handling

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur when talking to the generative-language backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout occurred
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response parsing error
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The fragment stream broke after it was opened
    #[error("Stream error: {0}")]
    Stream(String),

    /// Client could not be constructed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(err.to_string())
        } else if err.is_connect() {
            BackendError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            BackendError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}
