//! HTTP proxy in front of the Tapp API.
//!
//! Forwards `/api/tapp` and `/api/tapp/{*path}` to the upstream API:
//! - GET and POST with query string and body preserved
//! - Permissive CORS headers on every response
//! - A fixed JSON error body when the upstream fails

/// Server configuration.
pub mod config;
/// Error types.
pub mod error;
/// Request handlers.
pub mod proxy;
/// Router and server startup.
pub mod server;

pub use config::ServerConfig;
pub use error::ApiError;
pub use proxy::TappProxy;
pub use server::{ApiServer, router};
