//! Router and server startup.

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::proxy::{TappProxy, cors_headers, get_path, get_root, post_path, post_root, preflight};
use axum::Router;
use axum::middleware;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Builds the proxy router.
pub fn router(proxy: TappProxy) -> Router {
    Router::new()
        .route("/api/tapp", get(get_root).post(post_root).options(preflight))
        .route("/api/tapp/{*path}", get(get_path).post(post_path).options(preflight))
        .layer(middleware::map_response(cors_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(proxy)
}

/// HTTP server in front of the Tapp API.
pub struct ApiServer {
    config: ServerConfig,
}

impl ApiServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn router(&self) -> Result<Router, ApiError> {
        Ok(router(TappProxy::new(&self.config)?))
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> Result<(), ApiError> {
        let app = self.router()?;
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            addr = %self.config.bind_addr,
            upstream = %self.config.tapp_api_base_url,
            "Tapp proxy listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Tapp proxy stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
