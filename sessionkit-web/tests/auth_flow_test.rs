//! End-to-end session lifecycle through the HTTP router

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use helpers::*;
use serde_json::json;
use sessionkit_core::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use sessionkit_web::users::UserRepository;
use tower::ServiceExt;

fn register_body(client_type: &str) -> serde_json::Value {
    json!({
        "email": "ada@example.com",
        "password": "secret1",
        "firstName": "Ada",
        "clientType": client_type
    })
}

fn login_body(password: &str, client_type: &str) -> serde_json::Value {
    json!({
        "email": "ada@example.com",
        "password": password,
        "clientType": client_type
    })
}

#[tokio::test]
async fn test_web_register_sets_cookies_without_tokens_in_body() {
    let app = spawn_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", register_body("Web")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let cookies = set_cookies(&response);
    let access = cookies
        .iter()
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
        .expect("access cookie");
    let refresh = cookies
        .iter()
        .find(|c| c.name() == REFRESH_TOKEN_COOKIE)
        .expect("refresh cookie");
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(access.secure(), Some(true));
    assert_eq!(access.path(), Some("/"));
    assert_eq!(refresh.max_age(), Some(time::Duration::days(7)));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], "Created");
    assert!(body["data"]["expiresAt"].is_string());
    assert!(body["data"].get("accessToken").is_none());
    assert!(body["data"].get("refreshToken").is_none());
}

#[tokio::test]
async fn test_mobile_login_returns_tokens_and_no_cookies() {
    let app = spawn_app();
    app.router
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", register_body("Mobile")))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            login_body("secret1", "Mobile"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());

    let body = body_json(response).await;
    let token = body["data"]["accessToken"].as_str().unwrap();
    assert!(body["data"]["refreshToken"].is_string());

    // The bearer token opens the profile route
    let profile = app
        .router
        .clone()
        .oneshot(with_bearer(
            Request::get("/api/user").body(Body::empty()).unwrap(),
            token,
        ))
        .await
        .unwrap();
    assert_eq!(profile.status(), StatusCode::OK);
    let profile = body_json(profile).await;
    assert_eq!(profile["data"]["email"], "ada@example.com");
    assert_eq!(profile["data"]["firstName"], "Ada");
    assert_eq!(profile["data"]["lastName"], "");
}

#[tokio::test]
async fn test_bad_login_and_duplicate_register_envelopes() {
    let app = spawn_app();
    app.router
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", register_body("Web")))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            login_body("wrong-password", "Web"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email or password");

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", register_body("Web")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "User with this email already exists");
}

#[tokio::test]
async fn test_refresh_with_expired_access_cookie_issues_new_pair() {
    let app = spawn_app();
    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", register_body("Web")))
        .await
        .unwrap();
    let cookies = live_cookies(&response);

    // Swap in an access token that expired an hour ago
    let user = app
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    let stale = app
        .state
        .sessions
        .codec()
        .issue_access_at(&user, Utc::now() - Duration::hours(1))
        .unwrap();
    let cookies: Vec<(String, String)> = cookies
        .into_iter()
        .map(|(name, value)| {
            if name == ACCESS_TOKEN_COOKIE {
                (name, stale.token.clone())
            } else {
                (name, value)
            }
        })
        .collect();

    // The stale token no longer opens protected routes
    let rejected = app
        .router
        .clone()
        .oneshot(with_cookies(
            Request::get("/api/user").body(Body::empty()).unwrap(),
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(with_cookies(
            Request::post("/api/auth/refresh").body(Body::empty()).unwrap(),
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let renewed = live_cookies(&response);
    assert_eq!(renewed.len(), 2);
    let new_access = renewed
        .iter()
        .find(|(name, _)| name == ACCESS_TOKEN_COOKIE)
        .unwrap();
    assert_ne!(new_access.1, stale.token);

    let body = body_json(response).await;
    assert!(body["data"].get("accessToken").is_none());

    let profile = app
        .router
        .clone()
        .oneshot(with_cookies(
            Request::get("/api/user").body(Body::empty()).unwrap(),
            &renewed,
        ))
        .await
        .unwrap();
    assert_eq!(profile.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_failures_are_unauthorized() {
    let app = spawn_app();

    let missing = app
        .router
        .clone()
        .oneshot(Request::post("/api/auth/refresh").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(missing).await["message"], "Refresh token not found");

    let garbage = vec![
        (ACCESS_TOKEN_COOKIE.to_string(), "garbage".to_string()),
        (REFRESH_TOKEN_COOKIE.to_string(), "opaque".to_string()),
    ];
    let invalid = app
        .router
        .clone()
        .oneshot(with_cookies(
            Request::post("/api/auth/refresh").body(Body::empty()).unwrap(),
            &garbage,
        ))
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(invalid).await["message"], "Invalid access token");
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = spawn_app();
    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", register_body("Web")))
        .await
        .unwrap();
    let cookies = live_cookies(&response);

    let first = app
        .router
        .clone()
        .oneshot(with_cookies(
            Request::post("/api/auth/logout").body(Body::empty()).unwrap(),
            &cookies,
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    // Both cookies are expired, none carries a credential
    let removals = set_cookies(&first);
    assert_eq!(removals.len(), 2);
    assert!(removals.iter().all(|cookie| cookie.value().is_empty()));
    assert!(live_cookies(&first).is_empty());

    let second = app
        .router
        .clone()
        .oneshot(Request::post("/api/auth/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert!(set_cookies(&second).is_empty());
    let body = body_json(second).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Logout successful");
}
