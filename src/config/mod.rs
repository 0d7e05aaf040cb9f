//! Configuration loading and management

mod io;
mod settings;
mod token;

pub use settings::{DatabaseSettings, JobSettings, NotificationSettings, ServerSettings};
pub use io::write_config_file;
pub use token::generate_auth_token;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::{LevelCurve, ProgressRules, StreakPolicy, XpRules};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    /// XP award rules
    #[serde(default)]
    pub xp: XpRules,

    /// Level curve and rank titles
    #[serde(default)]
    pub levels: LevelCurve,

    /// Streak rules
    #[serde(default)]
    pub streak: StreakPolicy,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub jobs: JobSettings,
}

impl Config {
    /// Build the immutable engine rules from this config
    pub fn rules(&self) -> ProgressRules {
        ProgressRules::new(self.xp.clone(), &self.levels, self.streak.clone())
    }

    /// Configured database path, or `~/.quest/quest.db`
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("quest.db"))
    }
}
