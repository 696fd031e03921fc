//! Staff notification webhook client.
//!
//! Posts short text messages to a configured webhook URL using the
//! Slack-compatible `{"text": ...}` payload. Notifications are best
//! effort by contract: callers log failures and carry on, a lost message
//! never fails the customer-facing operation that triggered it.

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur when posting a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("notification request failed: {0}")]
    Request(String),

    /// Webhook answered with a non-success status.
    #[error("notification webhook returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Webhook payload. Slack incoming webhooks and most chat tools accept
/// this shape.
#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    text: &'a str,
}

/// Notification webhook client.
#[derive(Clone)]
pub struct Notifier {
    /// HTTP client.
    client: Client,
    /// Webhook URL. Treated as a secret: Slack-style webhook URLs embed
    /// their token in the path.
    webhook_url: String,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("webhook_url", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Notifier {
    /// Create a new notifier.
    #[must_use]
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    /// Post a plain text message to the webhook.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the webhook answers with a
    /// non-success status.
    #[instrument(skip(self, text))]
    pub async fn post_text(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&TextPayload { text })
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("notification posted");
        Ok(())
    }
}
