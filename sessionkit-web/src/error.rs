//! Error types for the SessionKit server
//!
//! Per-request failures are [`AuthError`] values and always render as an
//! [`ApiResponse`] envelope with `success = false`. [`ConfigError`] only occurs while the
//! server is being built and aborts start-up.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sessionkit_core::{ApiResponse, ApiStatusCode};
use thiserror::Error;
use tracing::error;

/// Authentication and session errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; the two cases are deliberately identical
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("User with this email already exists")]
    EmailTaken,

    /// A credential the operation needs was not presented
    #[error("{0} not found")]
    MissingCredential(&'static str),

    /// A presented credential failed to parse or verify
    #[error("Invalid access token")]
    InvalidCredential,

    #[error("User not found")]
    UserNotFound,

    /// No valid access credential on a protected route
    #[error("Authentication required")]
    Unauthenticated,

    /// A resource looked up by a profile route does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Failed to create authentication token")]
    TokenCreation,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status and envelope code for this error
    pub fn status(&self) -> (StatusCode, ApiStatusCode) {
        match self {
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::MissingCredential(_)
            | AuthError::InvalidCredential
            | AuthError::UserNotFound
            | AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, ApiStatusCode::Unauthorized),
            AuthError::EmailTaken | AuthError::Validation(_) => {
                (StatusCode::BAD_REQUEST, ApiStatusCode::BadRequest)
            }
            AuthError::NotFound(_) => (StatusCode::NOT_FOUND, ApiStatusCode::NotFound),
            AuthError::TokenCreation | AuthError::Storage(_) | AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiStatusCode::InternalServerError,
            ),
        }
    }

    /// Message safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Storage(_) | AuthError::Internal(_) => {
                "An internal server error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        if status.is_server_error() {
            error!(error = %self, "Request failed with server error");
        }

        let body: ApiResponse<()> = ApiResponse::failure(code, self.public_message());
        (status, Json(body)).into_response()
    }
}

/// Start-up configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration key: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Error types for the web server
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
