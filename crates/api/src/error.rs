use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Message returned for every failed forward.
pub const UPSTREAM_FAILURE: &str = "Failed to fetch from Tapp API";

/// Failures reaching the upstream API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("Invalid JSON response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Forwarding failed; `details` is exposed for POST requests only.
    #[error("Failed to fetch from Tapp API")]
    Upstream { details: Option<String> },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Upstream { details: Some(details) } => json!({
                "error": UPSTREAM_FAILURE,
                "details": details,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
