//! Outbound notifications
//!
//! The completion flow and the background jobs hand finished
//! [`Notification`]s to a [`Notifier`]. Delivery is best effort: failures are
//! logged and never undo the state change that produced the notification.

mod webhook;

pub use webhook::WebhookNotifier;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::NotificationSettings;
use crate::domain::Notification;

/// Delivers notifications to users
pub trait Notifier: Send + Sync {
    fn send(&self, notification: &Notification) -> Result<()>;
}

/// Writes notifications to the log only
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            "[quest:notify] {} for {}: {}",
            notification.kind, notification.user_id, notification.payload
        );
        Ok(())
    }
}

/// Webhook notifier if a URL is configured, log-only otherwise
pub fn from_settings(settings: &NotificationSettings) -> Arc<dyn Notifier> {
    let url = settings.webhook_url.trim();
    if url.is_empty() {
        Arc::new(LogNotifier)
    } else {
        Arc::new(WebhookNotifier::new(url, settings.timeout_secs))
    }
}

/// Send each notification, logging failures. Returns how many were delivered.
pub fn dispatch(notifier: &dyn Notifier, notifications: &[Notification]) -> usize {
    let mut delivered = 0;
    for notification in notifications {
        match notifier.send(notification) {
            Ok(()) => delivered += 1,
            Err(e) => warn!(
                "[quest:notify] Failed to deliver {} to {}: {:#}",
                notification.kind, notification.user_id, e
            ),
        }
    }
    delivered
}
