//! SessionKit client
//!
//! Consuming side of the session lifecycle: a guard that renews an expired session once
//! for all concurrent callers, a persisted local view of the session, a background
//! expiry monitor and a typed API over the SessionKit server.

pub mod api;
pub mod config;
pub mod error;
mod fs;
pub mod guard;
pub mod monitor;
pub mod store;
pub mod transport;

pub use api::{Registration, SessionClient};
pub use config::{ClientConfig, GuardConfig};
pub use error::{ClientError, ClientResult};
pub use guard::{SessionGuard, SignInNavigator};
pub use monitor::{ExpiryMonitor, MonitorHandle, MonitorTick};
pub use store::{SessionState, SessionStore};
pub use transport::{ApiReply, ApiRequest, HttpTransport, Transport};
