//! HTTP webhook dispatch

use reqwest::{Client, Method};
use tracing::{debug, warn};

use super::{Notification, Notifier};
use crate::observability::Event;

/// Sends notifications with `reqwest` on a spawned task
#[derive(Debug, Clone, Default)]
pub struct HttpNotifier {
    client: Client,
}

impl HttpNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Performs the single delivery attempt
    async fn deliver(client: Client, notification: Notification) {
        let method = match Method::from_bytes(notification.method.as_bytes()) {
            Ok(method) => method,
            Err(e) => {
                warn!(event = %Event::NotifyFailed, method = %notification.method, error = %e, "bad method");
                return;
            }
        };

        let mut request = client
            .request(method, &notification.url)
            .timeout(notification.timeout)
            .body(notification.body.to_string());
        for (name, value) in &notification.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        match request.send().await {
            Ok(response) => debug!(
                event = %Event::NotifySent,
                url = %notification.url,
                status = response.status().as_u16(),
                "webhook delivered"
            ),
            Err(e) => warn!(
                event = %Event::NotifyFailed,
                url = %notification.url,
                error = %e,
                "webhook failed"
            ),
        }
    }
}

impl Notifier for HttpNotifier {
    fn send(&self, notification: Notification) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(event = %Event::NotifyFailed, url = %notification.url, "no async runtime, webhook dropped");
            return;
        };
        handle.spawn(Self::deliver(self.client.clone(), notification));
    }
}
