//! Request extractors for authenticated routes

use crate::{error::AuthError, AppState};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use sessionkit_core::ACCESS_TOKEN_COOKIE;
use tracing::debug;
use uuid::Uuid;

/// The caller behind a verified access token.
///
/// The token is read from the `AccessToken` cookie first, then from an
/// `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let token = match jar.get(ACCESS_TOKEN_COOKIE) {
            Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
            _ => {
                let TypedHeader(Authorization(bearer)) =
                    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                        .await
                        .map_err(|_| {
                            debug!("No access token on protected route");
                            AuthError::Unauthenticated
                        })?;
                bearer.token().to_string()
            }
        };

        let claims = app_state
            .sessions
            .codec()
            .verify_access(&token)
            .claims()
            .ok_or(AuthError::Unauthenticated)?;

        let id = claims.subject_id().ok_or(AuthError::Unauthenticated)?;

        Ok(AuthenticatedUser {
            id,
            email: claims.email,
        })
    }
}
