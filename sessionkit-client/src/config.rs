//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Path the server exposes for session renewal
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh";

/// Location interactive clients are sent to when the session cannot be renewed
pub const DEFAULT_SIGN_IN_PATH: &str = "/login";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the SessionKit server; API paths resolve below any path prefix it has
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// File the session cookies are kept in between runs (memory only when `None`)
    pub cookie_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
            user_agent: format!("sessionkit-client/{}", env!("CARGO_PKG_VERSION")),
            cookie_file: None,
        }
    }
}

impl ClientConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Keep session cookies in `path`
    pub fn with_cookie_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cookie_file = Some(path.into());
        self
    }
}

/// Behaviour of the session guard
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub refresh_path: String,
    pub sign_in_path: String,
    /// Give up on a refresh that has not settled after this long; unbounded when `None`
    pub refresh_timeout: Option<Duration>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            refresh_timeout: None,
        }
    }
}

impl GuardConfig {
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = Some(timeout);
        self
    }
}
