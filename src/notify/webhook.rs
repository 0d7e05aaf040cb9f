//! HTTP webhook delivery

use std::time::Duration;

use anyhow::{Context, Result};

use super::Notifier;
use crate::domain::Notification;

/// POSTs each notification as JSON to a fixed URL
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    client: ureq::Agent,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();

        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Notifier for WebhookNotifier {
    fn send(&self, notification: &Notification) -> Result<()> {
        let body =
            serde_json::to_string(notification).context("Failed to serialize notification")?;

        self.client
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    let body = resp.into_string().unwrap_or_default();
                    anyhow::anyhow!("webhook returned HTTP {}: {}", code, body.trim())
                }
                other => anyhow::anyhow!(other),
            })
            .with_context(|| format!("Failed to POST notification to {}", self.url))?;

        Ok(())
    }
}
