//! User storage
//!
//! The session layer only talks to [`UserRepository`]; the in-memory store backs tests
//! and development, the SQLite store backs real deployments.

#[cfg(feature = "sqlite")]
pub mod database;
pub mod memory;
pub mod profile;

#[cfg(feature = "sqlite")]
pub use database::SqliteUserRepository;
pub use memory::InMemoryUserRepository;
pub use profile::ProfileService;

use crate::error::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sessionkit_core::UserProfile;
use uuid::Uuid;

/// A stored user account, including its password hash
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// New active account with a fresh ID
    pub fn new(
        email: String,
        password_hash: String,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            first_name,
            last_name,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Public view of the account
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            is_active: self.is_active,
        }
    }
}

/// Lookup and persistence of user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AuthError>;

    /// Insert a new account; `EmailTaken` if the email is already registered
    async fn create(&self, identity: Identity) -> Result<Identity, AuthError>;

    /// Overwrite an existing account and return what was stored; `UserNotFound` if it
    /// does not exist
    async fn update(&self, identity: Identity) -> Result<Identity, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_fills_missing_names() {
        let identity = Identity::new(
            "a@b.com".to_string(),
            "hash".to_string(),
            Some("Ada".to_string()),
            None,
        );

        let profile = identity.to_profile();
        assert_eq!(profile.id, identity.id);
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.last_name, "");
        assert!(profile.is_active);
    }
}
