//! Request transport
//!
//! [`Transport`] is the seam between the session guard and the network, so the guard can
//! be exercised against a scripted server in tests.

use crate::{
    config::ClientConfig,
    error::{ClientError, ClientResult},
    fs::write_private,
};
use async_trait::async_trait;
use reqwest::{
    cookie::{CookieStore, Jar},
    header::{HeaderValue, AUTHORIZATION, USER_AGENT},
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use sessionkit_core::ApiResponse;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// An outbound API call, replayable as-is
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the server base URL, e.g. `/api/user`
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Bearer token for programmatic clients
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new<S: Into<String>>(method: Method, path: S) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn get<S: Into<String>>(path: S) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post<S: Into<String>>(path: S) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put<S: Into<String>>(path: S) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn bearer<S: Into<String>>(mut self, token: S) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Status and raw body of a response
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the response envelope.
    ///
    /// A non-success status becomes [`ClientError::Status`] carrying the envelope's message;
    /// an envelope with `success = false` becomes [`ClientError::Api`].
    pub fn envelope<T: DeserializeOwned>(&self) -> ClientResult<Option<T>> {
        let parsed = serde_json::from_slice::<ApiResponse<T>>(&self.body);

        if !self.is_success() {
            let message = match parsed {
                Ok(envelope) => envelope
                    .message
                    .unwrap_or_else(|| "Request failed".to_string()),
                Err(_) => String::from_utf8_lossy(&self.body).into_owned(),
            };
            return Err(ClientError::Status {
                status: self.status,
                message,
            });
        }

        parsed?.into_result().map_err(ClientError::Api)
    }
}

/// Sends API requests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> ClientResult<ApiReply>;
}

/// reqwest-backed transport with a cookie store, so cookie-delivered credentials ride
/// along with every request
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
    cookie_file: Option<PathBuf>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = directory_url(&config.base_url)?;
        let jar = Arc::new(Jar::default());

        if let Some(path) = &config.cookie_file {
            restore_cookies(&jar, &base_url, path);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, agent);
        } else {
            warn!("Ignoring invalid user agent '{}'", config.user_agent);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .build()?;

        debug!("Created HTTP transport for {}", base_url);

        Ok(Self {
            client,
            base_url,
            jar,
            cookie_file: config.cookie_file.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session cookies currently held for the server, as a `Cookie` header value
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    fn save_cookies(&self) {
        let Some(path) = &self.cookie_file else {
            return;
        };

        let result = match self.cookie_header() {
            Some(header) => write_private(path, header.as_bytes()),
            None if path.exists() => std::fs::remove_file(path),
            None => Ok(()),
        };

        if let Err(e) = result {
            warn!("Failed to save cookies to {}: {}", path.display(), e);
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> ClientResult<ApiReply> {
        let url = endpoint_url(&self.base_url, &request.path)?;
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        self.save_cookies();

        Ok(ApiReply { status, body })
    }
}

/// Parse the server URL so that it always names a directory, keeping any path prefix
fn directory_url(base_url: &str) -> ClientResult<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve an API path below the server URL rather than against its origin
fn endpoint_url(base_url: &Url, path: &str) -> ClientResult<Url> {
    Ok(base_url.join(path.trim_start_matches('/'))?)
}

fn restore_cookies(jar: &Jar, base_url: &Url, path: &Path) {
    let saved = match std::fs::read_to_string(path) {
        Ok(saved) => saved,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            warn!("Failed to read cookies from {}: {}", path.display(), e);
            return;
        }
    };

    let mut root = base_url.clone();
    root.set_path("/");
    for pair in saved.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        jar.add_cookie_str(&format!("{}; Path=/", pair), &root);
    }
}
