//! Shared helpers for the server integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use serde_json::Value;
use sessionkit_core::{init_logging, LoggingConfig};
use sessionkit_web::{
    auth::Argon2PasswordHasher,
    config::{CookieSettings, JwtSettings},
    create_app,
    users::InMemoryUserRepository,
    AppState, WebConfig,
};
use std::sync::{Arc, LazyLock};

// Set TEST_LOG to see server logs
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        init_logging(&LoggingConfig::with_level("debug")).ok();
    }
});

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: InMemoryUserRepository,
}

pub fn test_config() -> WebConfig {
    WebConfig {
        jwt: JwtSettings {
            secret_key: "integration-secret-integration-secret".to_string(),
            issuer: "sessionkit".to_string(),
            audience: "sessionkit-clients".to_string(),
            access_token_expiration_minutes: 15,
        },
        cookies: CookieSettings { secure: true },
        ..WebConfig::default()
    }
}

pub fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);

    let users = InMemoryUserRepository::new();
    let hasher =
        Argon2PasswordHasher::with_params(argon2::Params::new(8, 1, 1, None).expect("params"));
    let state = AppState::with_components(test_config(), Arc::new(users.clone()), Arc::new(hasher))
        .expect("Failed to build state");

    TestApp {
        router: create_app(state.clone()),
        state,
        users,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn with_cookies(mut request: Request<Body>, cookies: &[(String, String)]) -> Request<Body> {
    if !cookies.is_empty() {
        let value = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        request
            .headers_mut()
            .insert(header::COOKIE, value.parse().unwrap());
    }
    request
}

pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    request
}

/// Every `Set-Cookie` header of a response, parsed
pub fn set_cookies(response: &Response<Body>) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_string()).ok())
        .collect()
}

/// Name/value pairs a browser would send back
pub fn live_cookies(response: &Response<Body>) -> Vec<(String, String)> {
    set_cookies(response)
        .into_iter()
        .filter(|cookie| !cookie.value().is_empty())
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
