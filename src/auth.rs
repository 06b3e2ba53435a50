//! Shared-secret authentication
//!
//! Callers send `Authorization: API-Key <secret>`. The prefix is optional;
//! the remainder must equal the configured key exactly.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use subtle::ConstantTimeEq;

use crate::schema::{ValidationError, ValidationResult};

/// Scheme token stripped from the front of the header value
pub const AUTH_PREFIX: &str = "API-Key ";

/// The configured API key
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Checks the `Authorization` header against this key
    pub fn check(&self, headers: &HeaderMap) -> ValidationResult<()> {
        let raw = headers
            .get(AUTHORIZATION)
            .ok_or_else(ValidationError::missing_credentials)?;

        // Non-visible-ASCII header values can never match the key
        let raw = raw.to_str().map_err(|_| ValidationError::bad_credentials())?;
        let presented = raw.strip_prefix(AUTH_PREFIX).unwrap_or(raw);

        if constant_time_eq(presented.as_bytes(), self.0.as_bytes()) {
            Ok(())
        } else {
            Err(ValidationError::bad_credentials())
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
