//! Daily summary job
//!
//! After the configured local hour, every user who completed something today
//! gets one summary of the day's tasks and XP.

use anyhow::Result;
use chrono::{DateTime, Timelike, Utc};
use serde_json::json;

use super::JobRunner;
use crate::domain::{Notification, NotificationKind, UserProgress};
use crate::store::time_bucket::day_bucket;
use crate::store::{job_log, progress, settings};

pub(super) const JOB_NAME: &str = "daily_summary";

impl JobRunner {
    /// Send today's summaries if the summary hour has passed.
    ///
    /// Returns how many were delivered.
    pub fn run_daily_summaries(&self, now: DateTime<Utc>) -> Result<usize> {
        let policy = &self.rules.streak;
        if policy.local_datetime(now).hour() < self.settings.summary_hour {
            return Ok(0);
        }

        let day = day_bucket(policy, now);
        let totals = self.query.daily_totals(&day)?;
        let mut sent = 0;

        for total in totals {
            let (wants, snapshot) = {
                let conn = self.db.conn();
                let wants = settings::load_settings(&conn, &total.user_id)?.notify_daily_summary;
                let snapshot = progress::load_progress(&conn, &total.user_id)?
                    .unwrap_or_else(|| UserProgress::new(total.user_id.as_str()));
                (wants, snapshot)
            };
            if !wants || !job_log::claim(&self.db.conn(), JOB_NAME, &total.user_id, &day, now)? {
                continue;
            }

            let level = self.rules.levels.info(snapshot.lifetime_xp);
            let notification = Notification::new(
                NotificationKind::DailySummary,
                total.user_id.as_str(),
                json!({
                    "date": day,
                    "tasks_completed": total.tasks,
                    "xp_earned": total.xp,
                    "current_streak": snapshot.current_streak,
                    "level": level.level,
                    "rank_title": level.rank_title,
                    "progress_percent": level.progress_percent,
                }),
                now,
            );

            if self.deliver(&notification) {
                sent += 1;
            } else {
                job_log::release(&self.db.conn(), JOB_NAME, &total.user_id, &day)?;
            }
        }

        Ok(sent)
    }
}
