//! CLI argument definitions using clap
//!
//! Commands:
//! - cardstub init --config <path>
//! - cardstub serve --config <path>
//! - cardstub schemas --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cardstub - an emulated card-issuing API for development and testing
#[derive(Parser, Debug)]
#[command(name = "cardstub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a starter configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./cardstub.json")]
        config: PathBuf,
    },

    /// Start the card API server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./cardstub.json")]
        config: PathBuf,
    },

    /// Print the loaded request schemas and exit
    Schemas {
        /// Path to configuration file
        #[arg(long, default_value = "./cardstub.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["cardstub", "serve"]).unwrap();
        match cli.command {
            Command::Serve { config } => assert_eq!(config, PathBuf::from("./cardstub.json")),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cardstub",
            "schemas",
            "--config",
            "/etc/cardstub.json",
            "--verbose",
            "--json-logs",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.json_logs);
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["cardstub", "query"]).is_err());
    }
}
