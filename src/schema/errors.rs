//! Schema and validation error types
//!
//! Two families:
//! - `SchemaError`: a schema file itself is unusable (raised at load time)
//! - `ValidationError`: a request failed a schema check (raised per request)
//!
//! Validation failures are always reported to the caller, never fatal.

use serde_json::Value;
use thiserror::Error;

use super::types::{render_list, Primitive};

/// Result type for schema loading
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for request validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A schema definition that cannot be used
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Malformed schema '{schema}': {reason}")]
    Malformed { schema: String, reason: String },

    #[error("Schema '{schema}' field '{field}': unknown type '{type_name}'")]
    UnknownType {
        schema: String,
        field: String,
        type_name: String,
    },

    #[error("Schema '{schema}' field '{field}': enum declared without options")]
    EmptyEnum { schema: String, field: String },

    #[error("Schema '{schema}' field '{field}': data_type is empty")]
    EmptyTypes { schema: String, field: String },

    #[error("Schema '{0}' is already registered")]
    Duplicate(String),

    #[error("Failed to read schema directory '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    /// Create an error for an unparseable schema
    pub fn malformed(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            schema: schema.into(),
            reason: reason.into(),
        }
    }
}

/// Why a request was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{field} should be of type {}", render_list(.accepted))]
    TypeMismatch {
        field: String,
        accepted: Vec<Primitive>,
    },

    /// Raised both for a missing required value and for a value outside
    /// `options`; the message is the same in both cases.
    #[error("One of these values - {} is required for {field}", render_list(.options))]
    EnumRequired { field: String, options: Vec<Value> },

    #[error("Schema not found: {0}")]
    SchemaNotFound(String),
}

impl ValidationError {
    /// Missing `Authorization` header
    pub fn missing_credentials() -> Self {
        ValidationError::Unauthorized("Authorisation header needed".into())
    }

    /// Credential present but wrong
    pub fn bad_credentials() -> Self {
        ValidationError::Unauthorized("Unauthorised".into())
    }

    /// Empty or non-object payload
    pub fn empty_payload() -> Self {
        ValidationError::InvalidInput("Please provide a valid payload".into())
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationError::Unauthorized(_) => 401,
            ValidationError::InvalidInput(_) => 400,
            ValidationError::TypeMismatch { .. } => 400,
            ValidationError::EnumRequired { .. } => 400,
            ValidationError::SchemaNotFound(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_mismatch_message() {
        let err = ValidationError::TypeMismatch {
            field: "amount--value".into(),
            accepted: vec![Primitive::Int, Primitive::Null],
        };
        assert_eq!(err.to_string(), "amount--value should be of type [int, None]");
    }

    #[test]
    fn test_enum_message_names_options() {
        let err = ValidationError::EnumRequired {
            field: "kind".into(),
            options: vec![json!("charge"), json!("refund")],
        };
        assert_eq!(
            err.to_string(),
            "One of these values - [\"charge\", \"refund\"] is required for kind"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ValidationError::bad_credentials().status_code(), 401);
        assert_eq!(ValidationError::empty_payload().status_code(), 400);
        assert_eq!(ValidationError::SchemaNotFound("x".into()).status_code(), 500);
    }
}
