//! # Record Store Errors

use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for remote backing operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Record store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Absent locally, and the remote store confirmed it is absent too
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid record id: {0}")]
    InvalidId(String),

    #[error("Record {id} is not valid JSON: {reason}")]
    Corrupt { id: String, reason: String },

    /// Absent locally, and the remote store could not be reached
    #[error("Remote store unavailable while fetching {id}: {reason}")]
    RemoteUnavailable { id: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl StoreError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 404,
            StoreError::InvalidId(_) => 404,
            StoreError::Corrupt { .. } => 500,
            StoreError::RemoteUnavailable { .. } => 503,
            StoreError::Io(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::InvalidId(_))
    }
}

/// Remote object store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The store answered and the object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The store could not answer
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}
