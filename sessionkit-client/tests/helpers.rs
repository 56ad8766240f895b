//! Shared helpers for the client integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use sessionkit_client::{
    ApiReply, ApiRequest, ClientConfig, ClientResult, GuardConfig, SessionClient, SessionGuard,
    SessionStore, SignInNavigator, Transport,
};
use sessionkit_core::{ApiResponse, ApiStatusCode, AuthSdto, UserProfile};
use sessionkit_web::{
    auth::Argon2PasswordHasher,
    config::{CookieSettings, JwtSettings},
    create_app,
    users::InMemoryUserRepository,
    AppState, WebConfig,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// In-process stand-in for the server: protected paths answer 401 until a refresh
/// succeeds
pub struct ScriptedServer {
    pub refresh_calls: AtomicUsize,
    pub protected_calls: AtomicUsize,
    session_valid: AtomicBool,
    refresh_succeeds: bool,
    always_reject: bool,
    refresh_delay: Duration,
}

impl ScriptedServer {
    pub fn expired() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            protected_calls: AtomicUsize::new(0),
            session_valid: AtomicBool::new(false),
            refresh_succeeds: true,
            always_reject: false,
            refresh_delay: Duration::from_millis(50),
        }
    }

    pub fn refresh_fails(mut self) -> Self {
        self.refresh_succeeds = false;
        self
    }

    /// Protected paths stay rejected even after a successful refresh
    pub fn always_reject(mut self) -> Self {
        self.always_reject = true;
        self
    }

    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn protected(&self) -> usize {
        self.protected_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedServer {
    async fn send(&self, request: &ApiRequest) -> ClientResult<ApiReply> {
        if request.path == REFRESH_PATH {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.refresh_delay).await;

            if !self.refresh_succeeds {
                return Ok(failure(401, "Refresh token not found"));
            }

            self.session_valid.store(true, Ordering::SeqCst);
            let sdto = AuthSdto {
                expires_at: Some(Utc::now() + ChronoDuration::minutes(15)),
                ..Default::default()
            };
            return Ok(reply(200, &ApiResponse::ok(sdto, Some("Token refreshed"))));
        }

        if request.path.starts_with("/api/auth/") {
            return Ok(failure(401, "Invalid email or password"));
        }

        self.protected_calls.fetch_add(1, Ordering::SeqCst);
        if self.always_reject || !self.session_valid.load(Ordering::SeqCst) {
            return Ok(failure(401, "Unauthorized"));
        }

        Ok(reply(200, &ApiResponse::ok(profile(), None)))
    }
}

pub fn reply<T: Serialize>(status: u16, envelope: &ApiResponse<T>) -> ApiReply {
    ApiReply {
        status,
        body: serde_json::to_vec(envelope).expect("serialize envelope"),
    }
}

pub fn failure(status: u16, message: &str) -> ApiReply {
    let code = match status {
        400 => ApiStatusCode::BadRequest,
        401 => ApiStatusCode::Unauthorized,
        _ => ApiStatusCode::InternalServerError,
    };
    reply::<()>(status, &ApiResponse::failure(code, message))
}

pub fn profile() -> UserProfile {
    UserProfile {
        id: uuid::Uuid::nil(),
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        is_active: true,
    }
}

/// Records redirects instead of navigating
pub struct RecordingNavigator {
    location: Mutex<String>,
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn at(location: &str) -> Self {
        Self {
            location: Mutex::new(location.to_string()),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }

    pub fn location(&self) -> String {
        self.location.lock().expect("location lock").clone()
    }
}

impl SignInNavigator for RecordingNavigator {
    fn current_location(&self) -> Option<String> {
        Some(self.location())
    }

    fn redirect_to_sign_in(&self, sign_in_path: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.location.lock().expect("location lock") = sign_in_path.to_string();
    }
}

pub struct GuardFixture {
    pub server: Arc<ScriptedServer>,
    pub navigator: Arc<RecordingNavigator>,
    pub store: Arc<SessionStore>,
    pub guard: SessionGuard,
}

pub fn guard_fixture(server: ScriptedServer, config: GuardConfig) -> GuardFixture {
    let server = Arc::new(server);
    let navigator = Arc::new(RecordingNavigator::at("/dashboard"));
    let store = Arc::new(SessionStore::in_memory());
    let guard = SessionGuard::with_parts(
        server.clone(),
        config,
        Some(store.clone()),
        Some(navigator.clone()),
    );

    GuardFixture {
        server,
        navigator,
        store,
        guard,
    }
}

/// A real SessionKit server on an ephemeral port
pub struct LiveServer {
    pub base_url: String,
    pub state: AppState,
    pub users: InMemoryUserRepository,
}

pub async fn spawn_server() -> LiveServer {
    let config = WebConfig {
        jwt: JwtSettings {
            secret_key: "client-e2e-secret-client-e2e-secret".to_string(),
            issuer: "sessionkit".to_string(),
            audience: "sessionkit-clients".to_string(),
            access_token_expiration_minutes: 15,
        },
        // Plain HTTP on loopback
        cookies: CookieSettings { secure: false },
        ..WebConfig::default()
    };

    let users = InMemoryUserRepository::new();
    let hasher =
        Argon2PasswordHasher::with_params(argon2::Params::new(8, 1, 1, None).expect("params"));
    let state = AppState::with_components(config, Arc::new(users.clone()), Arc::new(hasher))
        .expect("Failed to build state");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let address = listener.local_addr().expect("local address");
    let app = create_app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    LiveServer {
        base_url: format!("http://{}", address),
        state,
        users,
    }
}

pub fn live_client(server: &LiveServer, config: ClientConfig) -> SessionClient {
    SessionClient::new(
        &ClientConfig {
            base_url: server.base_url.clone(),
            ..config
        },
        GuardConfig::default().with_refresh_timeout(Duration::from_secs(5)),
        Arc::new(SessionStore::in_memory()),
        None,
    )
    .expect("Failed to build client")
}
