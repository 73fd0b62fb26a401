//! Error types for the zonesync system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zonesync system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing API URL/token, bad key names)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (unknown record type, missing record value)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// DNS API returned a non-ok status
    #[error("DNS API error (status {status}): {body}")]
    Api {
        /// The `status` field from the response envelope
        status: String,
        /// Full response body, kept for diagnostics
        body: String,
    },

    /// Queue store access errors
    #[error("Queue store error: {0}")]
    Store(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a DNS API error carrying the full response body
    pub fn api(status: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Api {
            status: status.into(),
            body: body.into(),
        }
    }

    /// Create a queue store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
