//! Shared application state

use crate::{
    auth::{Argon2PasswordHasher, CredentialCodec, PasswordHasher, SessionService},
    config::WebConfig,
    error::WebResult,
    users::{InMemoryUserRepository, ProfileService, UserRepository},
};
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(feature = "sqlite")]
use crate::users::SqliteUserRepository;

/// Application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<WebConfig>,
    /// Login, register, refresh and logout
    pub sessions: SessionService,
    /// Profile of the signed-in user
    pub profiles: ProfileService,
}

impl AppState {
    /// Build state from configuration, choosing the user store from `database_url`
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        config.validate()?;

        let users: Arc<dyn UserRepository> = match &config.database_url {
            #[cfg(feature = "sqlite")]
            Some(url) => Arc::new(SqliteUserRepository::connect(url).await?),
            #[cfg(not(feature = "sqlite"))]
            Some(url) => {
                warn!(
                    "database_url '{}' ignored: built without the sqlite feature",
                    url
                );
                Arc::new(InMemoryUserRepository::new())
            }
            None => {
                warn!("No database configured, users are kept in memory");
                Arc::new(InMemoryUserRepository::new())
            }
        };

        Self::with_components(config, users, Arc::new(Argon2PasswordHasher::new()))
    }

    /// Build state around an explicit user store and password hasher
    pub fn with_components(
        config: WebConfig,
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> WebResult<Self> {
        let codec = CredentialCodec::new(&config.jwt)?;

        let state = Self {
            sessions: SessionService::new(users.clone(), hasher, codec),
            profiles: ProfileService::new(users),
            config: Arc::new(config),
        };

        info!("Application state initialized successfully");
        Ok(state)
    }
}
