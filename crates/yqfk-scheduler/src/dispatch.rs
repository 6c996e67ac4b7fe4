//! Notification dispatch through the ServerChan push relay.
//!
//! Delivery is best effort: [`ServerChan::dispatch`] logs failures and never
//! hands them back to the run.

use yqfk_core::error::{Result, YqfkError};

use crate::notify::Notification;

/// Relay base URL. The send key is appended as a path segment.
pub const RELAY_BASE_URL: &str = "https://sc.ftqq.com/";

/// Substring the relay puts in an accepted response.
const RELAY_OK_MARKER: &str = "success";

/// ServerChan relay client.
#[derive(Clone)]
pub struct ServerChan {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl ServerChan {
    pub fn new(key: &str) -> Self {
        Self::with_base_url(RELAY_BASE_URL, key)
    }

    pub fn with_base_url(base_url: &str, key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.key.is_empty()
    }

    /// Send and report delivery failures as errors.
    /// API: GET {base}{key}.send?text=..&desp=..
    pub async fn send(&self, notification: &Notification) -> Result<()> {
        let url = format!("{}{}.send", self.base_url, self.key);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("text", notification.title.as_str()),
                ("desp", notification.body.as_str()),
            ])
            .send()
            .await
            .map_err(|e| YqfkError::NotificationDelivery(format!("relay unreachable: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| YqfkError::NotificationDelivery(format!("relay response: {e}")))?;

        if body.contains(RELAY_OK_MARKER) {
            Ok(())
        } else {
            Err(YqfkError::NotificationDelivery(format!("relay {status}: {body}")))
        }
    }

    /// Fire-and-forget delivery.
    pub async fn dispatch(&self, notification: &Notification) {
        if !self.is_configured() {
            tracing::warn!("No notification key set, skipping '{}'", notification.title);
            return;
        }
        match self.send(notification).await {
            Ok(()) => tracing::info!("📢 Notification sent: {}", notification.title),
            Err(e) => tracing::error!("{e}"),
        }
    }
}

impl std::fmt::Debug for ServerChan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerChan")
            .field("base_url", &self.base_url)
            .field("key", &"***")
            .finish()
    }
}
