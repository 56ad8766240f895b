//! Route definitions for the SessionKit server

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes (mounted under `/api`)
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .nest("/auth", auth_routes())
        // Current user
        .route(
            "/user",
            get(handlers::get_user).put(handlers::update_user),
        )
        // API documentation
        .route("/openapi.json", get(openapi::serve_openapi))
}

/// Create authentication routes (mounted under `/api/auth`)
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}
