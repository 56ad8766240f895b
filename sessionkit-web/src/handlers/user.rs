//! Profile handlers for the signed-in user

use crate::{auth::AuthenticatedUser, error::AuthError, AppState};
use axum::{extract::State, response::Json};
use sessionkit_core::{ApiResponse, UpdateUserRequest, UserProfile};

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "User",
    summary = "Current user",
    responses(
        (status = 200, description = "Profile of the signed-in user", body = ApiResponse<UserProfile>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "User not found")
    ),
    security(("access_token" = []), ("bearer" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<UserProfile>>, AuthError> {
    let profile = state.profiles.profile(user.id).await?;
    Ok(Json(ApiResponse::ok(profile, None)))
}

/// Update the current user's names
#[utoipa::path(
    put,
    path = "/api/user",
    tag = "User",
    summary = "Update current user",
    description = "Blank or missing fields are left unchanged",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserProfile>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "User not found")
    ),
    security(("access_token" = []), ("bearer" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, AuthError> {
    let profile = state.profiles.update(user.id, request).await?;
    Ok(Json(ApiResponse::ok(profile, Some("User updated successfully"))))
}
