//! Session lifecycle: login, register, refresh, logout

use super::{
    codec::CredentialCodec,
    delivery::{clear_session_cookies, DeliveryResult},
    password::PasswordHasher,
};
use crate::{
    error::AuthError,
    users::{Identity, UserRepository},
};
use axum_extra::extract::cookie::CookieJar;
use sessionkit_core::{
    validate_email, validate_new_password, ClientKind, LoginRequest, RegisterRequest,
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Issues and renews session credentials.
///
/// Stateless across requests: every call reads what it needs from the user store and the
/// presented credentials.
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    codec: CredentialCodec,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        codec: CredentialCodec,
    ) -> Self {
        Self {
            users,
            hasher,
            codec,
        }
    }

    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    /// Authenticate with email and password
    pub async fn login(&self, request: LoginRequest) -> Result<DeliveryResult, AuthError> {
        let email = request.email.trim();

        let Some(identity) = self.users.find_by_email(email).await? else {
            warn!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &identity.password_hash) {
            warn!(user_id = %identity.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        // Only reported once the password is known to be right
        if !identity.is_active {
            warn!(user_id = %identity.id, "Login rejected: account inactive");
            return Err(AuthError::AccountInactive);
        }

        let delivery = self.issue_pair(&identity, request.client_type)?;
        info!(user_id = %identity.id, client = %request.client_type, "User logged in");
        Ok(delivery)
    }

    /// Create an account and sign it in
    pub async fn register(&self, request: RegisterRequest) -> Result<DeliveryResult, AuthError> {
        let email = request.email.trim();

        validate_email(email).map_err(|e| AuthError::Validation(e.message.to_string()))?;
        validate_new_password(&request.password)
            .map_err(|e| AuthError::Validation(e.message.to_string()))?;

        if self.users.email_exists(email).await? {
            warn!("Registration rejected: email already registered");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let identity = self
            .users
            .create(Identity::new(
                email.to_string(),
                password_hash,
                request.first_name,
                request.last_name,
            ))
            .await?;

        let delivery = self.issue_pair(&identity, request.client_type)?;
        info!(user_id = %identity.id, client = %request.client_type, "User registered");
        Ok(delivery)
    }

    /// Renew the pair carried by the session cookies.
    ///
    /// The previous access token may be expired but must still carry a valid signature,
    /// issuer and audience. The result is always cookie-delivered.
    pub async fn refresh(&self, jar: &CookieJar) -> Result<DeliveryResult, AuthError> {
        // Presence only: refresh tokens are not stored server-side
        require_cookie(jar, REFRESH_TOKEN_COOKIE, "Refresh token")?;
        let previous = require_cookie(jar, ACCESS_TOKEN_COOKIE, "Access token")?;

        let claims = self
            .codec
            .decode_ignoring_expiry(previous)
            .claims()
            .ok_or_else(|| {
                warn!("Refresh rejected: previous access token does not verify");
                AuthError::InvalidCredential
            })?;

        let user_id = claims.subject_id().ok_or_else(|| {
            warn!("Refresh rejected: subject is not a user id");
            AuthError::InvalidCredential
        })?;

        let Some(identity) = self.users.find_by_id(user_id).await? else {
            warn!(%user_id, "Refresh rejected: user no longer exists");
            return Err(AuthError::UserNotFound);
        };

        if !identity.is_active {
            warn!(%user_id, "Refresh rejected: account inactive");
            return Err(AuthError::AccountInactive);
        }

        let delivery = self.issue_pair(&identity, ClientKind::Web)?;
        info!(%user_id, "Session refreshed");
        Ok(delivery)
    }

    /// End the session held in `jar`; succeeds whether or not cookies are present
    pub fn logout(&self, jar: CookieJar) -> CookieJar {
        let had_session =
            jar.get(ACCESS_TOKEN_COOKIE).is_some() || jar.get(REFRESH_TOKEN_COOKIE).is_some();
        debug!(had_session, "Logging out");
        clear_session_cookies(jar)
    }

    fn issue_pair(
        &self,
        identity: &Identity,
        kind: ClientKind,
    ) -> Result<DeliveryResult, AuthError> {
        let access = self.codec.issue_access(identity)?;
        let refresh = self.codec.issue_refresh();
        Ok(DeliveryResult::for_client(
            kind,
            access.token,
            refresh,
            access.expires_at,
        ))
    }
}

fn require_cookie<'a>(
    jar: &'a CookieJar,
    name: &str,
    label: &'static str,
) -> Result<&'a str, AuthError> {
    jar.get(name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            debug!("{} cookie missing", name);
            AuthError::MissingCredential(label)
        })
}
