//! Shared test utilities for quest integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use quest::completion::CompletionOrchestrator;
use quest::engine::ProgressRules;
use quest::engine::achievements::AchievementCatalog;
use quest::notify::Notifier;
use quest::store::QuestDb;
use quest::{CompletionEvent, Notification, NotificationKind, Priority};

/// Notifier that keeps everything it was asked to send
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent().into_iter().map(|n| n.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: &Notification) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("notification endpoint unavailable");
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// A database file in a temp dir plus an orchestrator over it
pub struct TestEnv {
    pub dir: TempDir,
    pub db: QuestDb,
    pub orchestrator: Arc<CompletionOrchestrator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_rules(ProgressRules::default())
    }

    pub fn with_rules(rules: ProgressRules) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = QuestDb::open(&dir.path().join("quest.db")).expect("Failed to open db");
        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator = Arc::new(CompletionOrchestrator::new(
            db.clone(),
            rules,
            AchievementCatalog::standard(),
            notifier.clone(),
        ));

        Self {
            dir,
            db,
            orchestrator,
            notifier,
        }
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        self.dir.path().join("quest.db")
    }
}

/// UTC timestamp in March 2024 (1 March is a Friday)
pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
}

pub fn event(
    user: &str,
    task: &str,
    occurred_at: DateTime<Utc>,
    priority: Priority,
) -> CompletionEvent {
    CompletionEvent {
        task_id: task.to_string(),
        user_id: user.to_string(),
        task_title: format!("Task {task}"),
        priority,
        occurred_at,
    }
}
