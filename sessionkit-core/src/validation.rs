//! Input validation shared by the server and the client forms

use thiserror::Error;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum accepted password length
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Validate an email address the way the sign-in forms do
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FieldError::new("email", "Email is required"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(FieldError::new("email", "Invalid email address"));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') || email.contains(' ') {
        return Err(FieldError::new("email", "Invalid email address"));
    }

    Ok(())
}

/// Validate a password chosen at registration
pub fn validate_new_password(password: &str) -> Result<(), FieldError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(FieldError::new(
            "password",
            "Password must be less than 100 characters",
        ));
    }

    Ok(())
}
