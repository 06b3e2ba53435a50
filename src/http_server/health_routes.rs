//! Health HTTP Routes

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

/// Liveness response, in the same envelope as every other reply
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
}

/// Health check routes at `/` and `/health`
pub fn health_routes() -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        success: true,
        message: "Hello there".to_string(),
    };

    (StatusCode::OK, Json(response))
}
