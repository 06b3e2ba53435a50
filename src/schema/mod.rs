//! Request schema subsystem
//!
//! Each endpoint has a schema: a flat map from field path to rule. Requests
//! are authenticated, then checked field by field against it.
//!
//! # Design Principles
//!
//! - Schema files are parsed into typed rules once, at load time
//! - Authentication runs before any shape check
//! - Validation never mutates the payload
//! - The first failing field decides the error

mod errors;
mod loader;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaResult, ValidationError, ValidationResult};
pub use loader::SchemaLoader;
pub use types::{FieldKind, FieldRule, Presence, Primitive, Schema, PATH_SEPARATOR};
pub use validator::{SchemaValidator, Verdict};

pub(crate) use types::to_wire;
