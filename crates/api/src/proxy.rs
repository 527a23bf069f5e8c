//! Pass-through proxy to the Tapp API.

use crate::config::ServerConfig;
use crate::error::{ApiError, UpstreamError};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, USER_AGENT,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

/// User agent sent upstream.
pub const PROXY_USER_AGENT: &str = "Fleeditto-Frontend/1.0";

/// Forwards requests to the configured upstream.
#[derive(Debug, Clone)]
pub struct TappProxy {
    http: Client,
    base_url: String,
}

impl TappProxy {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            http,
            base_url: config.tapp_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `base[/path][?query]`.
    pub fn upstream_url(&self, path: Option<&str>, query: Option<&str>) -> String {
        let mut url = self.base_url.clone();
        if let Some(path) = path.map(|p| p.trim_start_matches('/')).filter(|p| !p.is_empty()) {
            url.push('/');
            url.push_str(path);
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Sends the request and parses the upstream body as JSON. Non-2xx is an error.
    pub async fn forward(&self, url: &str, body: Option<Bytes>) -> Result<Value, UpstreamError> {
        let request = match body {
            Some(body) => self.http.post(url).body(body),
            None => self.http.get(url),
        };
        let response = request
            .header(CONTENT_TYPE.as_str(), "application/json")
            .header(USER_AGENT.as_str(), PROXY_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn proxy_get(proxy: &TappProxy, path: Option<&str>, query: Option<String>) -> Result<Json<Value>, ApiError> {
    let url = proxy.upstream_url(path, query.as_deref());
    debug!(url = %url, "Proxying GET");
    proxy.forward(&url, None).await.map(Json).map_err(|e| {
        warn!(url = %url, error = %e, "Tapp API GET failed");
        ApiError::Upstream { details: None }
    })
}

async fn proxy_post(
    proxy: &TappProxy,
    path: Option<&str>,
    query: Option<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let url = proxy.upstream_url(path, query.as_deref());
    debug!(url = %url, bytes = body.len(), "Proxying POST");
    proxy.forward(&url, Some(body)).await.map(Json).map_err(|e| {
        warn!(url = %url, error = %e, "Tapp API POST failed");
        ApiError::Upstream {
            details: Some(e.to_string()),
        }
    })
}

pub async fn get_root(State(proxy): State<TappProxy>, RawQuery(query): RawQuery) -> Result<Json<Value>, ApiError> {
    proxy_get(&proxy, None, query).await
}

pub async fn get_path(
    State(proxy): State<TappProxy>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, ApiError> {
    proxy_get(&proxy, Some(&path), query).await
}

pub async fn post_root(
    State(proxy): State<TappProxy>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    proxy_post(&proxy, None, query, body).await
}

pub async fn post_path(
    State(proxy): State<TappProxy>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    proxy_post(&proxy, Some(&path), query, body).await
}

/// Preflight: headers only.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Adds permissive CORS headers to every response.
pub async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(base: &str) -> TappProxy {
        TappProxy::new(&ServerConfig {
            tapp_api_base_url: base.to_string(),
            ..ServerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_upstream_url() {
        let proxy = proxy("https://api.tapp.exchange/");
        assert_eq!(proxy.upstream_url(None, None), "https://api.tapp.exchange");
        assert_eq!(
            proxy.upstream_url(Some("pools/list"), Some("page=2&size=10")),
            "https://api.tapp.exchange/pools/list?page=2&size=10"
        );
        assert_eq!(proxy.upstream_url(Some(""), Some("")), "https://api.tapp.exchange");
    }
}
