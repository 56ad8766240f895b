//! Server configuration
//!
//! Values are layered: built-in defaults, then an optional `sessionkit.toml` (or an
//! explicit file), then `SESSIONKIT__*` environment variables. Signing material is
//! validated once here so a misconfigured server never starts.

use crate::error::ConfigError;
use chrono::Duration;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Default access credential lifetime
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 15;

/// Longest accepted access credential lifetime, the refresh cookie's seven days
pub const MAX_ACCESS_TOKEN_MINUTES: i64 = 7 * 24 * 60;

/// Secrets shorter than this are accepted but reported at start-up
const RECOMMENDED_SECRET_BYTES: usize = 32;

/// Access credential signing settings
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// HMAC signing secret
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default = "default_access_minutes")]
    pub access_token_expiration_minutes: i64,
}

fn default_access_minutes() -> i64 {
    DEFAULT_ACCESS_TOKEN_MINUTES
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            issuer: String::new(),
            audience: String::new(),
            access_token_expiration_minutes: DEFAULT_ACCESS_TOKEN_MINUTES,
        }
    }
}

impl JwtSettings {
    pub fn access_token_lifetime(&self) -> Duration {
        Duration::minutes(self.access_token_expiration_minutes)
    }

    /// Fail fast on missing or unusable signing settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.trim().is_empty() {
            return Err(ConfigError::Missing("jwt.secret_key"));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Missing("jwt.issuer"));
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::Missing("jwt.audience"));
        }
        if self.access_token_expiration_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "jwt.access_token_expiration_minutes",
                message: "must be a positive number of minutes".to_string(),
            });
        }
        if self.access_token_expiration_minutes > MAX_ACCESS_TOKEN_MINUTES {
            return Err(ConfigError::Invalid {
                key: "jwt.access_token_expiration_minutes",
                message: format!("must not exceed {} minutes", MAX_ACCESS_TOKEN_MINUTES),
            });
        }

        if self.secret_key.len() < RECOMMENDED_SECRET_BYTES {
            warn!(
                "jwt.secret_key is shorter than {} bytes; use a longer secret in production",
                RECOMMENDED_SECRET_BYTES
            );
        }

        Ok(())
    }
}

/// Cookie delivery settings
#[derive(Debug, Clone, Deserialize)]
pub struct CookieSettings {
    /// Mark cookies `Secure`; only disable for plain-http local development
    #[serde(default = "default_true")]
    pub secure: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

/// Configuration for the web server
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    #[serde(default)]
    pub dev_mode: bool,
    /// Database URL; users are kept in memory when absent
    #[serde(default)]
    pub database_url: Option<String>,
    /// Browser origins allowed to call the API with credentials
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub jwt: JwtSettings,
    #[serde(default)]
    pub cookies: CookieSettings,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            database_url: None,
            cors_origins: vec!["http://localhost:3000".to_string()],
            jwt: JwtSettings::default(),
            cookies: CookieSettings::default(),
        }
    }
}

impl WebConfig {
    /// Load configuration from `sessionkit.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of `sessionkit.toml` when given
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name("sessionkit").required(false),
        };

        let settings = ::config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("dev_mode", false)?
            .set_default("cors_origins", vec!["http://localhost:3000"])?
            .set_default(
                "jwt.access_token_expiration_minutes",
                DEFAULT_ACCESS_TOKEN_MINUTES,
            )?
            .set_default("cookies.secure", true)?
            .add_source(file_source)
            .add_source(
                ::config::Environment::with_prefix("SESSIONKIT")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()?;

        let config: WebConfig = settings.try_deserialize()?;
        Ok(config)
    }

    /// Validate everything the server needs before it can start
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;

        if !self.cookies.secure && !self.dev_mode {
            warn!("cookies.secure is disabled outside development mode");
        }

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
