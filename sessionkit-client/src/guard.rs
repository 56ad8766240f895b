//! Single-flight session refresh
//!
//! [`SessionGuard`] wraps every outbound call. When a protected endpoint answers 401 the
//! guard renews the session once, however many requests were rejected at the same time,
//! and replays each rejected request exactly once after the renewal settles.

use crate::{
    config::GuardConfig,
    error::{ClientError, ClientResult},
    store::SessionStore,
    transport::{ApiReply, ApiRequest, Transport},
};
use futures::future::{BoxFuture, FutureExt, Shared};
use sessionkit_core::{AuthSdto, AUTH_PATH_PREFIX};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type RefreshOutcome = Result<(), Arc<ClientError>>;
type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Where an interactive client sends its user when the session is gone
pub trait SignInNavigator: Send + Sync {
    /// Current location, if the client has one
    fn current_location(&self) -> Option<String>;

    fn redirect_to_sign_in(&self, sign_in_path: &str);
}

/// Outbound call wrapper with coordinated session renewal
#[derive(Clone)]
pub struct SessionGuard {
    inner: Arc<GuardInner>,
}

struct GuardInner {
    transport: Arc<dyn Transport>,
    navigator: Option<Arc<dyn SignInNavigator>>,
    store: Option<Arc<SessionStore>>,
    config: GuardConfig,
    in_flight: Mutex<Option<PendingRefresh>>,
}

impl SessionGuard {
    pub fn new(transport: Arc<dyn Transport>, config: GuardConfig) -> Self {
        Self::with_parts(transport, config, None, None)
    }

    pub fn with_parts(
        transport: Arc<dyn Transport>,
        config: GuardConfig,
        store: Option<Arc<SessionStore>>,
        navigator: Option<Arc<dyn SignInNavigator>>,
    ) -> Self {
        Self {
            inner: Arc::new(GuardInner {
                transport,
                navigator,
                store,
                config,
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.inner.config
    }

    /// Send `request`, renewing the session and replaying once on a 401.
    ///
    /// Authentication endpoints are passed through untouched. The replayed response is
    /// returned whatever its status.
    pub async fn send(&self, request: &ApiRequest) -> ClientResult<ApiReply> {
        let reply = self.inner.transport.send(request).await?;

        if reply.status != 401 || is_auth_endpoint(&request.path) {
            return Ok(reply);
        }

        debug!("{} {} rejected, waiting for session refresh", request.method, request.path);
        self.refresh().await?;

        debug!("Replaying {} {}", request.method, request.path);
        self.inner.transport.send(request).await
    }

    /// Renew the session, joining the renewal already in flight if there is one
    pub async fn refresh(&self) -> ClientResult<()> {
        let pending = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let pending = self.inner.clone().start_refresh();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await.map_err(ClientError::RefreshFailed)
    }

    /// Whether a renewal is currently in flight
    pub async fn is_refreshing(&self) -> bool {
        self.inner.in_flight.lock().await.is_some()
    }
}

impl GuardInner {
    fn start_refresh(self: Arc<Self>) -> PendingRefresh {
        async move {
            let outcome = self.run_refresh().await;

            self.in_flight.lock().await.take();

            match outcome {
                Ok(()) => {
                    info!("Session refreshed");
                    Ok(())
                }
                Err(e) => {
                    warn!("Session refresh failed: {}", e);
                    self.send_to_sign_in();
                    Err(Arc::new(e))
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn run_refresh(&self) -> ClientResult<()> {
        let request = ApiRequest::post(self.config.refresh_path.clone());
        let attempt = self.transport.send(&request);

        let reply = match self.config.refresh_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .map_err(|_| ClientError::RefreshTimedOut)??,
            None => attempt.await?,
        };

        let expires_at = reply.envelope::<AuthSdto>()?.and_then(|sdto| sdto.expires_at);
        if let (Some(store), Some(expires_at)) = (&self.store, expires_at) {
            store.set_expires_at(Some(expires_at));
        }

        Ok(())
    }

    fn send_to_sign_in(&self) {
        let Some(navigator) = &self.navigator else {
            return;
        };

        let sign_in_path = &self.config.sign_in_path;
        let already_there = navigator
            .current_location()
            .is_some_and(|location| location.contains(sign_in_path.as_str()));

        if !already_there {
            navigator.redirect_to_sign_in(sign_in_path);
        }
    }
}

fn is_auth_endpoint(path: &str) -> bool {
    path.contains(AUTH_PATH_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_endpoints_are_recognised() {
        assert!(is_auth_endpoint("/api/auth/login"));
        assert!(is_auth_endpoint("/api/auth/refresh"));
        assert!(!is_auth_endpoint("/api/user"));
        assert!(!is_auth_endpoint("/api/authors"));
    }
}
