//! SessionKit web server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main SessionKit web server
pub struct SessionKitServer {
    config: WebConfig,
    state: AppState,
}

impl SessionKitServer {
    /// Create a new server; fails if the configuration cannot sign credentials
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server and run until Ctrl-C
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting SessionKit web server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);
        if !self.config.cookies.secure {
            warn!("Session cookies are sent without the Secure attribute");
        }

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down gracefully");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Builder for SessionKitServer
pub struct SessionKitServerBuilder {
    config: WebConfig,
}

impl SessionKitServerBuilder {
    /// Start from built-in defaults
    pub fn new() -> Self {
        Self::from_config(WebConfig::default())
    }

    /// Start from a loaded configuration
    pub fn from_config(config: WebConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = Some(database_url.into());
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<SessionKitServer> {
        SessionKitServer::new(self.config).await
    }
}

impl Default for SessionKitServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
