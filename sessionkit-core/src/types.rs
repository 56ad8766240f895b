//! Wire types shared by the server and its clients
//!
//! Every payload is serialized in camelCase and enums as their variant names, which is
//! what browser clients of the API already expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Path prefix shared by every authentication endpoint.
pub const AUTH_PATH_PREFIX: &str = "/api/auth/";

/// Cookie carrying the access credential for interactive clients.
pub const ACCESS_TOKEN_COOKIE: &str = "AccessToken";

/// Cookie carrying the refresh credential for interactive clients.
pub const REFRESH_TOKEN_COOKIE: &str = "RefreshToken";

/// How a client wants its credentials delivered.
///
/// Chosen once at login/register time. `Web` clients get two server-set cookies,
/// `Mobile` clients get both tokens in the response body and manage them themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ClientKind {
    /// Interactive client, cookie delivery
    Web,
    /// Programmatic client, bearer delivery
    Mobile,
}

impl ClientKind {
    pub fn is_interactive(&self) -> bool {
        matches!(self, ClientKind::Web)
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientKind::Web => write!(f, "Web"),
            ClientKind::Mobile => write!(f, "Mobile"),
        }
    }
}

/// Login request body
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub client_type: ClientKind,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("client_type", &self.client_type)
            .finish()
    }
}

/// Registration request body
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub client_type: ClientKind,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("client_type", &self.client_type)
            .finish()
    }
}

/// Credential payload returned by login, register and refresh.
///
/// For cookie delivery both token fields are omitted and only `expiresAt` is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthSdto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSdto {
    /// Whether this payload carries any credential material
    pub fn carries_tokens(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }
}

/// Public view of a user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

/// Profile update request; blank or missing fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Status carried inside the response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ApiStatusCode {
    Success,
    Created,
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
}

impl ApiStatusCode {
    /// Numeric HTTP status matching this code
    pub fn as_u16(&self) -> u16 {
        match self {
            ApiStatusCode::Success => 200,
            ApiStatusCode::Created => 201,
            ApiStatusCode::NoContent => 204,
            ApiStatusCode::BadRequest => 400,
            ApiStatusCode::Unauthorized => 401,
            ApiStatusCode::Forbidden => 403,
            ApiStatusCode::NotFound => 404,
            ApiStatusCode::InternalServerError => 500,
        }
    }
}

/// Response envelope wrapping every API payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status_code: ApiStatusCode,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: Option<&str>) -> Self {
        Self::with_data(ApiStatusCode::Success, data, message)
    }

    pub fn created(data: T, message: Option<&str>) -> Self {
        Self::with_data(ApiStatusCode::Created, data, message)
    }

    pub fn failure(status_code: ApiStatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code,
            message: Some(message.into()),
            data: None,
            timestamp: Utc::now(),
        }
    }

    fn with_data(status_code: ApiStatusCode, data: T, message: Option<&str>) -> Self {
        Self {
            success: true,
            status_code,
            message: message.map(str::to_string),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    /// Convert into the payload, or the envelope's message when it reports failure
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .message
                .unwrap_or_else(|| "Request failed".to_string()))
        }
    }
}

impl ApiResponse<()> {
    /// Successful envelope without payload
    pub fn empty(message: &str) -> Self {
        Self {
            success: true,
            status_code: ApiStatusCode::Success,
            message: Some(message.to_string()),
            data: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_kind_wire_names() {
        assert_eq!(serde_json::to_value(ClientKind::Web).unwrap(), json!("Web"));
        assert_eq!(
            serde_json::from_value::<ClientKind>(json!("Mobile")).unwrap(),
            ClientKind::Mobile
        );
        assert!(ClientKind::Web.is_interactive());
        assert!(!ClientKind::Mobile.is_interactive());
    }

    #[test]
    fn test_cookie_payload_omits_tokens() {
        let sdto = AuthSdto {
            access_token: None,
            refresh_token: None,
            expires_at: Some(Utc::now()),
        };

        let value = serde_json::to_value(&sdto).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("expiresAt"));
        assert!(!sdto.carries_tokens());
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            email: "a@b.com".to_string(),
            password: "hunter22".to_string(),
            client_type: ClientKind::Web,
        };

        let rendered = format!("{:?}", request);
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("hunter22"));
    }

    #[test]
    fn test_envelope_failure_into_result() {
        let response: ApiResponse<AuthSdto> =
            ApiResponse::failure(ApiStatusCode::Unauthorized, "Invalid email or password");

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], json!("Unauthorized"));
        assert_eq!(value["success"], json!(false));
        assert_eq!(
            response.into_result().unwrap_err(),
            "Invalid email or password"
        );
    }

    #[test]
    fn test_envelope_parses_null_data() {
        let raw = json!({
            "success": true,
            "statusCode": "Success",
            "message": "Logout successful",
            "data": null,
            "timestamp": "2025-01-01T00:00:00Z"
        });

        let response: ApiResponse<()> = serde_json::from_value(raw).unwrap();
        assert!(response.success);
        assert_eq!(response.status_code.as_u16(), 200);
        assert!(response.data.is_none());
    }
}
