//! Proxy server configuration.

use crate::error::ApiError;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Upstream Tapp API.
pub const TAPP_API_BASE_URL: &str = "https://api.tapp.exchange";
/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,
    /// Base URL requests are forwarded to.
    pub tapp_api_base_url: String,
    /// Timeout of one upstream request.
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            tapp_api_base_url: TAPP_API_BASE_URL.to_string(),
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Reads `PROXY_BIND_ADDR` and `TAPP_API_BASE_URL`, falling back to defaults.
    pub fn from_env() -> Result<Self, ApiError> {
        let bind = env::var("PROXY_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|_| ApiError::Config(format!("invalid PROXY_BIND_ADDR: {bind}")))?;
        Ok(Self {
            bind_addr,
            tapp_api_base_url: env::var("TAPP_API_BASE_URL").unwrap_or_else(|_| TAPP_API_BASE_URL.to_string()),
            ..Self::default()
        })
    }
}
