//! Error types for the platform clients.

use incident::{CallError, Platform};
use thiserror::Error;

/// Errors that can occur when calling a platform API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("API returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: reqwest::StatusCode,
        /// Response body
        body: String,
    },

    /// Slack answered `ok: false`
    #[error("{0}")]
    Slack(String),

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client could not be constructed
    #[error("Invalid client configuration: {0}")]
    Setup(String),
}

impl ClientError {
    /// Attribute this error to a platform operation.
    #[must_use]
    pub fn into_call(self, platform: Platform, operation: &str) -> CallError {
        CallError::new(platform, operation, self.to_string())
    }
}
