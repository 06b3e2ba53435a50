//! CLI-specific error types
//!
//! Every CLI error is fatal: main prints it and exits non-zero. The
//! rendered message starts with a stable code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("CARDSTUB_CONFIG_ERROR: {0}")]
    Config(String),

    #[error("CARDSTUB_IO_ERROR: {0}")]
    Io(String),

    #[error("CARDSTUB_ALREADY_INITIALIZED: {} already exists", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("CARDSTUB_BOOT_FAILED: {0}")]
    BootFailed(String),
}

impl CliError {
    /// Stable code prefix of the message
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CARDSTUB_CONFIG_ERROR",
            CliError::Io(_) => "CARDSTUB_IO_ERROR",
            CliError::AlreadyInitialized(_) => "CARDSTUB_ALREADY_INITIALIZED",
            CliError::BootFailed(_) => "CARDSTUB_BOOT_FAILED",
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::BootFailed(e.to_string())
    }
}
