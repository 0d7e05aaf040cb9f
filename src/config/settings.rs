//! Service settings types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Local HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address
    /// Default: 127.0.0.1
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Default: 9877
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret required on every request (sent as `X-Quest-Token`)
    ///
    /// If empty, the server accepts unauthenticated requests.
    #[serde(default)]
    pub auth_token: String,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9877
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            auth_token: String::new(),
        }
    }
}

/// Database location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Defaults to `~/.quest/quest.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Outbound notification delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Notifications are POSTed here as JSON. Empty means log only.
    #[serde(default)]
    pub webhook_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Background job scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    /// How often `quest serve` runs the background jobs
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Remind users whose streak expires within this many hours
    #[serde(default = "default_reminder_window_hours")]
    pub reminder_window_hours: u32,

    /// Local hour (0-23) after which the daily summary for that day is sent
    #[serde(default = "default_summary_hour")]
    pub summary_hour: u32,
}

fn default_interval_secs() -> u64 {
    900
}

fn default_reminder_window_hours() -> u32 {
    12
}

fn default_summary_hour() -> u32 {
    21
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            reminder_window_hours: default_reminder_window_hours(),
            summary_hour: default_summary_hour(),
        }
    }
}
