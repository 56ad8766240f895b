//! Health check handlers

use super::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, response::Json};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Check the server health status",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let user_store = if state.config.database_url.is_some() {
        "sqlite"
    } else {
        "memory"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        user_store: user_store.to_string(),
    })
}
