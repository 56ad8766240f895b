//! Client error types

use sessionkit_core::FieldError;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the SessionKit client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status; `message` comes from the response envelope when present
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The server answered with `success = false`
    #[error("{0}")]
    Api(String),

    /// The shared session refresh failed; every waiting request gets the same cause
    #[error("Session refresh failed: {0}")]
    RefreshFailed(Arc<ClientError>),

    #[error("Session refresh timed out")]
    RefreshTimedOut,

    #[error("Invalid input: {0}")]
    Validation(#[from] FieldError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status behind this error, looking through a failed refresh
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::RefreshFailed(cause) => cause.status(),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the caller has to sign in again
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, ClientError::RefreshFailed(_) | ClientError::RefreshTimedOut)
            || self.status() == Some(401)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
