//! Background jobs
//!
//! Jobs read progress snapshots and send notifications. They never modify
//! progress; their only writes go to the `job_log` table, which keeps each
//! job to one notification per user per local day.

mod daily_summary;
mod streak_reminder;

pub use streak_reminder::ReminderCandidate;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::config::JobSettings;
use crate::domain::Notification;
use crate::engine::ProgressRules;
use crate::notify::Notifier;
use crate::store::{QuestDb, QuestQuery};

/// Counts from one pass over all jobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub streak_reminders: usize,
    pub daily_summaries: usize,
}

/// Runs the periodic jobs against one database
pub struct JobRunner {
    db: QuestDb,
    query: QuestQuery,
    rules: ProgressRules,
    settings: JobSettings,
    notifier: Arc<dyn Notifier>,
}

impl JobRunner {
    pub fn new(
        db: QuestDb,
        rules: ProgressRules,
        settings: JobSettings,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            query: QuestQuery::new(db.clone()),
            db,
            rules,
            settings,
            notifier,
        }
    }

    /// One pass over every job. A failing job does not stop the others.
    pub fn run_all(&self, now: DateTime<Utc>) -> JobReport {
        let mut report = JobReport::default();

        match self.run_streak_reminders(now) {
            Ok(n) => report.streak_reminders = n,
            Err(e) => error!("[quest:jobs] Streak reminder job failed: {:#}", e),
        }
        match self.run_daily_summaries(now) {
            Ok(n) => report.daily_summaries = n,
            Err(e) => error!("[quest:jobs] Daily summary job failed: {:#}", e),
        }

        if report != JobReport::default() {
            info!(
                "[quest:jobs] Sent {} streak reminder(s), {} daily summary(ies)",
                report.streak_reminders, report.daily_summaries
            );
        }
        report
    }

    fn deliver(&self, notification: &Notification) -> bool {
        match self.notifier.send(notification) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "[quest:jobs] Failed to deliver {} to {}: {:#}",
                    notification.kind, notification.user_id, e
                );
                false
            }
        }
    }

    /// Run every `interval_secs` on the tokio runtime until the task is aborted
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let period = Duration::from_secs(self.settings.interval_secs.max(1));
        tokio::spawn(async move {
            info!("[quest:jobs] Running background jobs every {:?}", period);
            let mut ticker = interval(period);

            loop {
                ticker.tick().await;
                let runner = Arc::clone(&self);
                // SQLite and the webhook client block
                let pass = tokio::task::spawn_blocking(move || runner.run_all(Utc::now()));
                if let Err(e) = pass.await {
                    error!("[quest:jobs] Job pass panicked: {}", e);
                }
            }
        })
    }
}
