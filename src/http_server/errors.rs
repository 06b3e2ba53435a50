//! HTTP error responses
//!
//! Every failure renders as `{"success": false, "message": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::observability::Event;
use crate::schema::{ValidationError, Verdict};
use crate::store::StoreError;

/// Message returned for unknown card ids and tokens
pub const CARD_NOT_FOUND: &str = "Card doesn't exist in temporary Storage";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::Validation(e) => e.status_code(),
            ApiError::Store(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Client-facing message
    pub fn message(&self) -> String {
        match self {
            ApiError::Store(e) if e.is_not_found() => CARD_NOT_FOUND.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(event = %Event::RequestRejected, status = status.as_u16(), error = %self, "request failed");
        } else {
            debug!(event = %Event::RequestRejected, status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(Verdict::fail(self.message()))).into_response()
    }
}
