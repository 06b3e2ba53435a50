//! Shared handler state

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::auth::ApiKey;
use crate::notify::{CardEvent, Notifier, Webhook};
use crate::schema::{SchemaLoader, SchemaValidator};
use crate::store::TieredStore;

/// Everything the card handlers need, shared behind an `Arc`
#[derive(Debug)]
pub struct AppState {
    pub schemas: SchemaLoader,
    pub api_key: ApiKey,
    pub store: TieredStore,
    pub notifier: Arc<dyn Notifier>,
    /// `None` disables notifications
    pub webhook: Option<Webhook>,
    pub card_image_url: String,
}

impl AppState {
    pub fn new(
        schemas: SchemaLoader,
        api_key: ApiKey,
        store: TieredStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            schemas,
            api_key,
            store,
            notifier,
            webhook: None,
            card_image_url: String::new(),
        }
    }

    pub fn with_webhook(mut self, webhook: Option<Webhook>) -> Self {
        self.webhook = webhook;
        self
    }

    pub fn with_card_image_url(mut self, url: impl Into<String>) -> Self {
        self.card_image_url = url.into();
        self
    }

    pub fn validator(&self) -> SchemaValidator<'_> {
        SchemaValidator::new(&self.schemas, &self.api_key)
    }

    /// Announces a card event; a no-op without a webhook
    pub fn announce(&self, event: CardEvent, card_id: &str, ledger_id: Option<&Value>) {
        if let Some(webhook) = &self.webhook {
            self.notifier
                .send(webhook.card_event(event, card_id, ledger_id, Utc::now()));
        }
    }
}
