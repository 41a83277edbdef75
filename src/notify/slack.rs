// src/notify/slack.rs
// =============================================================================
// Slack incoming webhook delivery.
//
// A webhook takes a JSON body like {"text": "..."}; anything other than a
// 2xx answer means the message was not posted.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;

use super::{Notifier, NotifyError};

/// Posts messages to a Slack incoming webhook
pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_client(webhook_url, Client::new())
    }

    /// Optional builder for tests/tools
    pub fn with_client(webhook_url: impl Into<String>, client: Client) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client,
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let body = serde_json::json!({ "text": message });

        let response = self.client.post(&self.webhook_url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }

        tracing::info!(bytes = message.len(), "slack notification sent");
        Ok(())
    }
}
