//! In-memory user store

use super::{Identity, UserRepository};
use crate::error::AuthError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<Uuid, Identity>,
    /// email -> user id
    by_email: HashMap<String, Uuid>,
}

/// User store kept in process memory; contents are lost on restart
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Users>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        let users = self.users.read().await;
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.users.read().await.by_email.contains_key(email))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AuthError> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn create(&self, identity: Identity) -> Result<Identity, AuthError> {
        let mut users = self.users.write().await;

        if users.by_email.contains_key(&identity.email) {
            return Err(AuthError::EmailTaken);
        }

        users.by_email.insert(identity.email.clone(), identity.id);
        users.by_id.insert(identity.id, identity.clone());

        debug!("Stored user {} in memory", identity.id);
        Ok(identity)
    }

    async fn update(&self, identity: Identity) -> Result<Identity, AuthError> {
        let mut users = self.users.write().await;

        let Some(existing) = users.by_id.get(&identity.id) else {
            return Err(AuthError::UserNotFound);
        };

        if existing.email != identity.email {
            if users.by_email.contains_key(&identity.email) {
                return Err(AuthError::EmailTaken);
            }
            let old_email = existing.email.clone();
            users.by_email.remove(&old_email);
            users.by_email.insert(identity.email.clone(), identity.id);
        }

        users.by_id.insert(identity.id, identity.clone());
        Ok(identity)
    }
}
