//! OpenAPI specification for the SessionKit API

use axum::response::Json;
use sessionkit_core::{
    ApiStatusCode, AuthSdto, ClientKind, LoginRequest, RegisterRequest, UpdateUserRequest,
    UserProfile, ACCESS_TOKEN_COOKIE,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::HealthResponse;

/// OpenAPI document for the SessionKit server
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SessionKit API",
        version = "0.1.0",
        description = "Session-token lifecycle: login, register, refresh and logout with cookie or bearer delivery",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::login,
        crate::handlers::register,
        crate::handlers::refresh,
        crate::handlers::logout,
        crate::handlers::get_user,
        crate::handlers::update_user,
    ),
    components(
        schemas(
            HealthResponse,
            ClientKind,
            LoginRequest,
            RegisterRequest,
            AuthSdto,
            UserProfile,
            UpdateUserRequest,
            ApiStatusCode,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Authentication", description = "Session lifecycle operations"),
        (name = "User", description = "Profile of the signed-in user"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the two ways an access token can be presented
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "access_token",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ACCESS_TOKEN_COOKIE))),
            );
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document
pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
