//! Streak reminder job
//!
//! Users with an active streak whose grace deadline falls inside the reminder
//! window, and who have not completed anything today, get one reminder per
//! local day.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::debug;

use super::JobRunner;
use crate::domain::{Notification, NotificationKind, UserProgress};
use crate::engine::StreakState;
use crate::store::time_bucket::day_bucket;
use crate::store::{job_log, progress, settings};

pub(super) const JOB_NAME: &str = "streak_reminder";

/// A reminder that should go out, before dedup
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderCandidate {
    pub user_id: String,
    pub streak: u32,
    pub deadline: DateTime<Utc>,
}

impl JobRunner {
    /// Users whose streak is about to lapse, from a read-only snapshot
    pub fn streak_reminder_candidates(&self, now: DateTime<Utc>) -> Result<Vec<ReminderCandidate>> {
        let snapshot = progress::load_active_streaks(&self.db.conn())?;
        let window = Duration::hours(i64::from(self.settings.reminder_window_hours));

        Ok(snapshot
            .into_iter()
            .filter_map(|p| self.reminder_for(&p, now, window))
            .collect())
    }

    fn reminder_for(
        &self,
        progress: &UserProgress,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Option<ReminderCandidate> {
        let last = progress.last_completion_at?;
        let policy = &self.rules.streak;

        if policy.local_date(last) == policy.local_date(now) {
            return None;
        }

        match policy.state(progress.current_streak, Some(last), now) {
            StreakState::Active { count, deadline } if deadline - now <= window => {
                Some(ReminderCandidate {
                    user_id: progress.user_id.clone(),
                    streak: count,
                    deadline,
                })
            }
            _ => None,
        }
    }

    /// Send due streak reminders. Returns how many were delivered.
    pub fn run_streak_reminders(&self, now: DateTime<Utc>) -> Result<usize> {
        let candidates = self.streak_reminder_candidates(now)?;
        let day = day_bucket(&self.rules.streak, now);
        let mut sent = 0;

        for candidate in candidates {
            let wants = settings::load_settings(&self.db.conn(), &candidate.user_id)?
                .notify_streak_reminder;
            if !wants {
                continue;
            }
            if !job_log::claim(&self.db.conn(), JOB_NAME, &candidate.user_id, &day, now)? {
                debug!(
                    "[quest:jobs] Streak reminder for {} already sent today",
                    candidate.user_id
                );
                continue;
            }

            let hours_left = (candidate.deadline - now).num_hours().max(0);
            let notification = Notification::new(
                NotificationKind::StreakReminder,
                candidate.user_id.as_str(),
                json!({
                    "reason": "streak_expiring",
                    "current_streak": candidate.streak,
                    "deadline": candidate.deadline,
                    "hours_left": hours_left,
                }),
                now,
            );

            if self.deliver(&notification) {
                sent += 1;
            } else {
                job_log::release(&self.db.conn(), JOB_NAME, &candidate.user_id, &day)?;
            }
        }

        Ok(sent)
    }
}
