//! SessionKit Core - Shared wire types and ambient setup
//!
//! This crate holds the types exchanged between the SessionKit server and its clients,
//! plus the logging bootstrap every binary in the workspace uses.

pub mod logging;
pub mod types;
pub mod validation;

pub use logging::*;
pub use types::*;
pub use validation::*;

// Re-export commonly used external types
pub use chrono;
pub use tracing;
pub use uuid;
