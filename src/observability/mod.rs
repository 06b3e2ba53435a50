//! Observability for cardstub
//!
//! Logging goes through `tracing`. Each call site attaches a stable
//! `event` field from [`Event`]:
//!
//! ```ignore
//! tracing::info!(event = %Event::CardIssued, card_id = %id, "card issued");
//! ```
//!
//! The CLI installs the subscriber; library code never does.

mod events;

pub use events::Event;

use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, one line per event
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `verbose` when set.
pub fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // A second init (tests, embedding) keeps the first subscriber
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
