//! # HTTP Server
//!
//! Combines the health and card routers behind CORS and request tracing.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::card_routes::card_routes;
use super::config::HttpServerConfig;
use super::health_routes::health_routes;
use super::state::AppState;
use crate::observability::Event;

/// Prefix of every card endpoint
pub const CARDS_PREFIX: &str = "/v1/customer";

/// HTTP server for the card API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over the given state
    pub fn new(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        let router = build_router(&config, state);
        Self { config, router }
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process exits
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        info!(event = %Event::Serving, %addr, "card API listening");
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

/// Build the combined router
pub fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_routes())
        .nest(CARDS_PREFIX, card_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(config.cors_layer())
}
