//! Profile reads and updates for the signed-in user

use super::UserRepository;
use crate::error::AuthError;
use chrono::Utc;
use sessionkit_core::{UpdateUserRequest, UserProfile};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|identity| identity.to_profile())
            .ok_or(AuthError::NotFound("User"))
    }

    /// Apply the non-blank fields of `request`
    pub async fn update(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<UserProfile, AuthError> {
        let mut identity = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound("User"))?;

        if let Some(first_name) = non_blank(request.first_name) {
            identity.first_name = Some(first_name);
        }
        if let Some(last_name) = non_blank(request.last_name) {
            identity.last_name = Some(last_name);
        }
        identity.updated_at = Some(Utc::now());

        let identity = self.users.update(identity).await.map_err(|e| match e {
            AuthError::UserNotFound => AuthError::NotFound("User"),
            other => other,
        })?;

        info!(%user_id, "Profile updated");
        Ok(identity.to_profile())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
