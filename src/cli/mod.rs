//! CLI command implementations

pub mod complete;
pub mod init;
pub mod jobs;
pub mod report;
pub mod serve;
pub mod xp;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use quest::completion::CompletionOrchestrator;
use quest::config::Config;
use quest::engine::ProgressRules;
use quest::engine::achievements::AchievementCatalog;
use quest::notify::{self, Notifier};
use quest::store::{QuestDb, QuestQuery};

/// Everything a command needs, built from the global flags
pub struct App {
    pub config: Config,
    pub db: QuestDb,
    pub rules: ProgressRules,
    pub catalog: AchievementCatalog,
    pub notifier: Arc<dyn Notifier>,
}

impl App {
    /// Load config (`--config` or `~/.quest/config.toml`) and open the
    /// database (`--db`, `[database] path`, or `~/.quest/quest.db`)
    pub fn open(config_path: Option<&Path>, db_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let db_path = db_path.unwrap_or_else(|| config.database_path());
        debug!("Using database {}", db_path.display());

        let db = QuestDb::open(&db_path)?;
        Ok(Self {
            rules: config.rules(),
            catalog: AchievementCatalog::standard(),
            notifier: notify::from_settings(&config.notifications),
            config,
            db,
        })
    }

    pub fn query(&self) -> QuestQuery {
        QuestQuery::new(self.db.clone())
    }

    pub fn orchestrator(&self) -> CompletionOrchestrator {
        CompletionOrchestrator::new(
            self.db.clone(),
            self.rules.clone(),
            self.catalog.clone(),
            Arc::clone(&self.notifier),
        )
    }
}

/// Print `value` as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
