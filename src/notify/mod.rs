// src/notify/mod.rs
// =============================================================================
// This module delivers the check report to the operator.
//
// Currently implements:
// - Slack incoming webhooks (POST {"text": "..."} as JSON)
//
// The check cycle has already finished and been saved by the time we get
// here, so a failed delivery is reported but never undoes anything.
// =============================================================================

mod slack;

pub use slack::SlackNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to notify slack: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("slack answered HTTP {0}")]
    Rejected(u16),
}

/// Somewhere a text message can be sent
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
