//! CLI module for cardstub
//!
//! Provides command-line interface for:
//! - init: Write a starter configuration file
//! - serve: Boot and serve the card API
//! - schemas: Print the loaded request schemas

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_state, init, load_schemas, run, run_command, schemas, serve};
pub use errors::{CliError, CliResult};
