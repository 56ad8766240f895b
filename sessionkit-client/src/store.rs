//! Client-side session view
//!
//! Holds who is signed in and when their access credential expires. The user, expiry and
//! authenticated flag survive restarts in a small JSON file; the loading flag never does.

use crate::fs::write_private;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sessionkit_core::UserProfile;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Name of the persisted session file
pub const STORAGE_NAME: &str = "auth-storage";

/// Seconds before expiry at which the access credential is treated as expired
pub const EXPIRY_BUFFER_SECONDS: i64 = 60;

/// Snapshot of the client session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub authenticated: bool,
    pub loading: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            authenticated: false,
            loading: true,
            expires_at: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    user: Option<UserProfile>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_authenticated: bool,
}

/// Session view shared by the guard, the monitor and the API wrapper
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<SessionState>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            path: None,
        }
    }

    /// Open the store backed by `path`, restoring what was persisted there
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut state = SessionState::default();

        match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<PersistedSession>(&bytes) {
                Ok(saved) => {
                    state.user = saved.user;
                    state.expires_at = saved.expires_at;
                    state.authenticated = saved.is_authenticated;
                    debug!("Restored session from {}", path.display());
                }
                Err(e) => warn!("Ignoring unreadable session file {}: {}", path.display(), e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to read session file {}: {}", path.display(), e),
        }

        Self {
            state: RwLock::new(state),
            path: Some(path),
        }
    }

    /// Open the store in the per-user data directory
    pub fn open_default() -> Self {
        match default_storage_path() {
            Some(path) => Self::open(path),
            None => {
                warn!("No data directory available, session will not be persisted");
                Self::in_memory()
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().authenticated
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read().expires_at
    }

    /// Record the signed-in user; a present user means authenticated
    pub fn set_user(&self, user: Option<UserProfile>) {
        self.update(|state| {
            state.authenticated = user.is_some();
            state.user = user;
        });
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.update(|state| state.authenticated = authenticated);
    }

    pub fn set_loading(&self, loading: bool) {
        self.write().loading = loading;
    }

    pub fn set_expires_at(&self, expires_at: Option<DateTime<Utc>>) {
        self.update(|state| state.expires_at = expires_at);
    }

    /// Forget the user and credential expiry
    pub fn logout(&self) {
        self.update(|state| {
            state.user = None;
            state.authenticated = false;
            state.expires_at = None;
        });
    }

    /// Whether the access credential is expired or within the buffer of expiring.
    ///
    /// An unknown expiry counts as expired.
    pub fn check_token_expiry(&self) -> bool {
        self.check_token_expiry_at(Utc::now())
    }

    pub fn check_token_expiry_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => now > expires_at - Duration::seconds(EXPIRY_BUFFER_SECONDS),
            None => true,
        }
    }

    /// Settle the restored session at startup.
    ///
    /// A persisted user whose credential has already expired is signed out. Loading
    /// always ends.
    pub fn initialize(&self) {
        self.initialize_at(Utc::now());
    }

    pub fn initialize_at(&self, now: DateTime<Utc>) {
        let state = self.snapshot();
        if let (Some(_), Some(expires_at)) = (&state.user, state.expires_at) {
            if now >= expires_at {
                debug!("Persisted session expired at {}, signing out", expires_at);
                self.logout();
            }
        }
        self.set_loading(false);
    }

    fn update<F: FnOnce(&mut SessionState)>(&self, apply: F) {
        let persisted = {
            let mut state = self.write();
            apply(&mut state);
            PersistedSession {
                user: state.user.clone(),
                expires_at: state.expires_at,
                is_authenticated: state.authenticated,
            }
        };
        self.persist(&persisted);
    }

    fn persist(&self, session: &PersistedSession) {
        let Some(path) = &self.path else {
            return;
        };

        let result = serde_json::to_vec_pretty(session)
            .map_err(std::io::Error::other)
            .and_then(|bytes| write_private(path, &bytes));

        if let Err(e) = result {
            warn!("Failed to persist session to {}: {}", path.display(), e);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `<data dir>/sessionkit/auth-storage.json`
pub fn default_storage_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| {
        dir.join("sessionkit")
            .join(format!("{}.json", STORAGE_NAME))
    })
}
