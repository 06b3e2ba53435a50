//! # Webhook Notifications
//!
//! A best-effort side channel. `send` hands the notification off and
//! returns immediately:
//! - at most one delivery attempt
//! - no retry
//! - no result or acknowledgement reaches the caller
//!
//! Callers must not assume delivery.

mod client;

pub use client::HttpNotifier;

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// One outbound webhook call
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
    pub timeout: Duration,
}

/// Fire-and-forget dispatcher
pub trait Notifier: Send + Sync + fmt::Debug {
    fn send(&self, notification: Notification);
}

/// Drops every notification; used when no webhook URL is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, _notification: Notification) {}
}

/// Keeps notifications in memory instead of sending them
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything sent so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, notification: Notification) {
        // A panic elsewhere while holding the lock leaves the list intact
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Card lifecycle events announced to the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    AwaitingActivation,
    Activated,
    Suspended,
}

impl CardEvent {
    /// Value of the `type` field in the webhook body
    pub fn as_str(&self) -> &'static str {
        match self {
            CardEvent::AwaitingActivation => "card-awaiting-activation",
            CardEvent::Activated => "card-activated",
            CardEvent::Suspended => "card-suspended",
        }
    }
}

/// Webhook target and the fields stamped on every message
#[derive(Debug, Clone)]
pub struct Webhook {
    pub url: String,
    pub owner_id: String,
    pub secret: String,
    pub timeout: Duration,
}

impl Webhook {
    /// Builds the notification for a card event.
    ///
    /// `ledger_id` is only sent for newly issued cards.
    pub fn card_event(
        &self,
        event: CardEvent,
        card_id: &str,
        ledger_id: Option<&Value>,
        at: DateTime<Utc>,
    ) -> Notification {
        let mut body = json!({
            "card_id": card_id,
            "owner": self.owner_id,
            "type": event.as_str(),
            "created_at": timestamp(at),
            "secret": self.secret,
        });
        if let Some(ledger_id) = ledger_id {
            body["ledger_id"] = ledger_id.clone();
        }

        Notification {
            url: self.url.clone(),
            method: "POST".to_string(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body,
            timeout: self.timeout,
        }
    }
}

/// Millisecond-padded UTC timestamp, e.g. `2024-05-01T09:30:00.000Z`
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}
