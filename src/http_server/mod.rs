//! # Card API HTTP Server
//!
//! # Endpoints
//!
//! - `/`, `/health` - Health check
//! - `/v1/customer/cards/*` - Card issuing, lookup and status changes

pub mod card_routes;
pub mod config;
pub mod errors;
pub mod health_routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, CARD_NOT_FOUND};
pub use server::{build_router, HttpServer, CARDS_PREFIX};
pub use state::AppState;
