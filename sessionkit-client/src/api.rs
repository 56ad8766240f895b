//! Typed SessionKit API
//!
//! Authentication and profile calls on top of the session guard, keeping the local session
//! store in step with what the server reports. Calls declare themselves as `Web` clients so
//! credentials travel as cookies.

use crate::{
    config::{ClientConfig, GuardConfig},
    error::{ClientError, ClientResult},
    guard::{SessionGuard, SignInNavigator},
    monitor::ExpiryMonitor,
    store::SessionStore,
    transport::{ApiRequest, HttpTransport},
};
use sessionkit_core::{
    validate_email, validate_new_password, AuthSdto, ClientKind, LoginRequest, RegisterRequest,
    UpdateUserRequest, UserProfile,
};
use std::sync::Arc;
use tracing::{info, warn};

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const LOGOUT_PATH: &str = "/api/auth/logout";
const USER_PATH: &str = "/api/user";

/// Details for a new account
#[derive(Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct SessionClient {
    guard: SessionGuard,
    store: Arc<SessionStore>,
}

impl SessionClient {
    /// Client talking HTTP to `config.base_url`
    pub fn new(
        config: &ClientConfig,
        guard_config: GuardConfig,
        store: Arc<SessionStore>,
        navigator: Option<Arc<dyn SignInNavigator>>,
    ) -> ClientResult<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        let guard = SessionGuard::with_parts(transport, guard_config, Some(store.clone()), navigator);
        Ok(Self::from_parts(guard, store))
    }

    pub fn from_parts(guard: SessionGuard, store: Arc<SessionStore>) -> Self {
        Self { guard, store }
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Monitor that renews this client's session ahead of expiry
    pub fn expiry_monitor(&self) -> ExpiryMonitor {
        ExpiryMonitor::new(self.guard.clone(), self.store.clone())
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthSdto> {
        validate_email(email)?;

        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            client_type: ClientKind::Web,
        };
        let sdto = self.post_credentials(LOGIN_PATH, &body, "Login failed").await?;

        info!("Signed in as {}", body.email);
        self.record_sign_in(&sdto);
        Ok(sdto)
    }

    pub async fn register(&self, registration: Registration) -> ClientResult<AuthSdto> {
        validate_email(&registration.email)?;
        validate_new_password(&registration.password)?;

        let body = RegisterRequest {
            email: registration.email.trim().to_string(),
            password: registration.password,
            first_name: registration.first_name,
            last_name: registration.last_name,
            client_type: ClientKind::Web,
        };
        let sdto = self
            .post_credentials(REGISTER_PATH, &body, "Registration failed")
            .await?;

        info!("Registered {}", body.email);
        self.record_sign_in(&sdto);
        Ok(sdto)
    }

    /// End the session on the server, then locally
    pub async fn logout(&self) -> ClientResult<()> {
        let reply = self.guard.send(&ApiRequest::post(LOGOUT_PATH)).await?;
        reply.envelope::<()>()?;

        self.store.logout();
        info!("Signed out");
        Ok(())
    }

    /// Renew the session now
    pub async fn refresh(&self) -> ClientResult<()> {
        self.guard.refresh().await
    }

    /// Fetch the signed-in user; the local user is cleared when that fails
    pub async fn current_user(&self) -> ClientResult<UserProfile> {
        let result = self.fetch_user(ApiRequest::get(USER_PATH)).await;

        match &result {
            Ok(user) => self.store.set_user(Some(user.clone())),
            Err(e) => {
                warn!("Failed to load current user: {}", e);
                self.store.set_user(None);
            }
        }
        self.store.set_loading(false);

        result
    }

    pub async fn update_user(&self, update: &UpdateUserRequest) -> ClientResult<UserProfile> {
        let user = self
            .fetch_user(ApiRequest::put(USER_PATH).json(update)?)
            .await?;

        self.store.set_user(Some(user.clone()));
        Ok(user)
    }

    async fn post_credentials<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
        fallback: &str,
    ) -> ClientResult<AuthSdto> {
        let reply = self.guard.send(&ApiRequest::post(path).json(body)?).await?;
        reply
            .envelope::<AuthSdto>()?
            .ok_or_else(|| ClientError::Api(fallback.to_string()))
    }

    async fn fetch_user(&self, request: ApiRequest) -> ClientResult<UserProfile> {
        self.guard
            .send(&request)
            .await?
            .envelope::<UserProfile>()?
            .ok_or_else(|| ClientError::Api("User data missing from response".to_string()))
    }

    fn record_sign_in(&self, sdto: &AuthSdto) {
        if let Some(expires_at) = sdto.expires_at {
            self.store.set_expires_at(Some(expires_at));
        }
        self.store.set_authenticated(true);
    }
}
