//! Authentication handlers

use crate::{auth::DeliveryResult, error::AuthError, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_extra::extract::cookie::CookieJar;
use sessionkit_core::{ApiResponse, AuthSdto, LoginRequest, RegisterRequest};

type AuthReply = (CookieJar, Json<ApiResponse<AuthSdto>>);

fn deliver(state: &AppState, jar: CookieJar, delivery: DeliveryResult) -> (CookieJar, AuthSdto) {
    delivery.apply(
        jar,
        state.sessions.codec().access_lifetime(),
        &state.config.cookies,
    )
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    summary = "Log in",
    description = "Web clients receive HttpOnly cookies, Mobile clients receive the tokens in the body",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthSdto>),
        (status = 401, description = "Invalid email or password, or account inactive")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<AuthReply, AuthError> {
    let delivery = state.sessions.login(request).await?;
    let (jar, payload) = deliver(&state, jar, delivery);
    Ok((jar, Json(ApiResponse::ok(payload, Some("Login successful")))))
}

/// Create an account and sign it in
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    summary = "Register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = ApiResponse<AuthSdto>),
        (status = 400, description = "Email already registered or invalid input")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<AuthSdto>>), AuthError> {
    let delivery = state.sessions.register(request).await?;
    let (jar, payload) = deliver(&state, jar, delivery);
    Ok((
        StatusCode::CREATED,
        jar,
        Json(ApiResponse::created(payload, Some("Registration successful"))),
    ))
}

/// Renew the session held in the cookies
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Authentication",
    summary = "Refresh session",
    description = "Needs both session cookies; the previous access token may be expired",
    responses(
        (status = 200, description = "Session refreshed", body = ApiResponse<AuthSdto>),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Result<AuthReply, AuthError> {
    let delivery = state.sessions.refresh(&jar).await?;
    let (jar, payload) = deliver(&state, jar, delivery);
    Ok((
        jar,
        Json(ApiResponse::ok(payload, Some("Token refreshed successfully"))),
    ))
}

/// End the session; always succeeds
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    summary = "Log out",
    responses(
        (status = 200, description = "Logout successful")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    let jar = state.sessions.logout(jar);
    (jar, Json(ApiResponse::empty("Logout successful")))
}
