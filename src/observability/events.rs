//! Observable events
//!
//! Every log line carries an `event` field taken from this enum so the
//! output can be filtered without parsing messages.

use std::fmt;

/// Observable events in cardstub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// Schemas loaded
    SchemasLoaded,
    /// Listener bound, ready for requests
    Serving,

    // Requests
    /// Request failed validation
    RequestRejected,
    /// New card record created
    CardIssued,
    /// Card status changed
    CardStatusChanged,

    // Record store
    /// Record absent from the local tier
    RecordCacheMiss,
    /// Record copied from the remote tier into the local tier
    RecordFilled,
    /// Record written to the remote tier
    MirrorComplete,
    /// Remote write failed or timed out
    MirrorFailed,
    /// Remote tier could not be read
    RemoteUnavailable,
    /// Unreadable local record skipped during a scan
    RecordSkipped,

    // Notifications
    /// Webhook delivered (any HTTP status)
    NotifySent,
    /// Webhook could not be delivered
    NotifyFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::Serving => "CARDSTUB_SERVING",

            Event::RequestRejected => "REQUEST_REJECTED",
            Event::CardIssued => "CARD_ISSUED",
            Event::CardStatusChanged => "CARD_STATUS_CHANGED",

            Event::RecordCacheMiss => "RECORD_CACHE_MISS",
            Event::RecordFilled => "RECORD_FILLED",
            Event::MirrorComplete => "MIRROR_COMPLETE",
            Event::MirrorFailed => "MIRROR_FAILED",
            Event::RemoteUnavailable => "REMOTE_UNAVAILABLE",
            Event::RecordSkipped => "RECORD_SKIPPED",

            Event::NotifySent => "NOTIFY_SENT",
            Event::NotifyFailed => "NOTIFY_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
