//! HTTP request handlers for the SessionKit server
//!
//! Handlers are organized by functionality.

pub mod auth;
pub mod health;
pub mod types;
pub mod user;

pub use auth::*;
pub use health::*;
pub use types::*;
pub use user::*;
