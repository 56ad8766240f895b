//! Proactive expiry check
//!
//! While the session is authenticated, periodically compares the locally known expiry
//! against the clock and renews ahead of time through the guard.

use crate::{guard::SessionGuard, store::SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// How often the monitor looks at the expiry
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// What a single check did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorTick {
    /// Not authenticated, nothing to watch
    Skipped,
    /// Credential still outside the expiry buffer
    Fresh,
    Refreshed,
    /// Renewal failed and the local session was cleared
    SignedOut,
}

pub struct ExpiryMonitor {
    guard: SessionGuard,
    store: Arc<SessionStore>,
    interval: Duration,
}

impl ExpiryMonitor {
    pub fn new(guard: SessionGuard, store: Arc<SessionStore>) -> Self {
        Self {
            guard,
            store,
            interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one check
    pub async fn tick(&self) -> MonitorTick {
        if !self.store.is_authenticated() {
            return MonitorTick::Skipped;
        }

        if !self.store.check_token_expiry() {
            return MonitorTick::Fresh;
        }

        debug!("Access credential about to expire, refreshing");
        match self.guard.refresh().await {
            Ok(()) => MonitorTick::Refreshed,
            Err(e) => {
                // the guard has already sent the user to sign in
                info!("Signing out after failed refresh: {}", e);
                self.store.logout();
                MonitorTick::SignedOut
            }
        }
    }

    /// Check on a fixed interval until the returned handle is dropped
    pub fn spawn(self) -> MonitorHandle {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                self.tick().await;
            }
        });

        MonitorHandle { handle }
    }
}

/// Running monitor; stops when dropped
pub struct MonitorHandle {
    handle: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
