//! Error types for the TransitOps client.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for all client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Credential store error: {0}")]
    Store(#[from] AuthError),

    #[error("Authorization failed after token refresh: {method} {path}")]
    RetryExhausted { method: String, path: String },

    #[error("Session expired: {0}")]
    SessionExpired(String),
}

impl Error {
    /// Create an API error from a status code and response body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error means the caller must re-authenticate.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired(_) | Self::RetryExhausted { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
