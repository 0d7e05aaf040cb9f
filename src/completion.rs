//! Task completion flow
//!
//! One completion is applied as a single IMMEDIATE transaction: load the
//! user's progress, advance streak/XP/level, evaluate achievements, then write
//! progress (version compare-and-swap), history and unlocks. Notifications go
//! out only after the commit and cannot undo it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{
    AchievementUnlock, CompletionEvent, HistoryEntry, InboundEvent, Notification,
    NotificationKind, UserProgress, UserSettings,
};
use crate::engine::achievements::{
    AchievementCatalog, AchievementContext, Rarity, check_achievements,
};
use crate::engine::{self, Advance, ProgressRules, StreakTransition};
use crate::error::QuestError;
use crate::notify::{self, Notifier};
use crate::store::time_bucket::day_bucket;
use crate::store::{QuestDb, StoreError, progress, settings};

/// Why a completion was not applied
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error(transparent)]
    Invalid(#[from] QuestError),

    #[error("Failed to persist completion: {0}")]
    Store(#[from] StoreError),
}

impl CompletionError {
    /// Nothing was written; the same event can be submitted again
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionError::Invalid(_) => false,
            CompletionError::Store(e) => e.is_retryable(),
        }
    }
}

/// An achievement unlocked by this completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAchievement {
    pub key: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
}

/// Result of one completion, as reported to the caller
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub user_id: String,
    pub task_id: String,
    /// Event was already applied; nothing was awarded this time
    pub duplicate: bool,
    pub xp_awarded: u32,
    pub lifetime_xp: u64,
    pub level: u32,
    pub previous_level: u32,
    pub leveled_up: bool,
    pub rank_title: String,
    pub progress_percent: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_transition: Option<StreakTransition>,
    pub streak_deadline: Option<DateTime<Utc>>,
    pub new_achievements: Vec<NewAchievement>,
    pub notifications_sent: usize,
}

/// What the transaction committed
enum Committed {
    Duplicate(UserProgress),
    Applied {
        advance: Box<Advance>,
        previous_streak: u32,
        unlocked: Vec<NewAchievement>,
        settings: UserSettings,
    },
}

/// Applies completion events to the store
pub struct CompletionOrchestrator {
    db: QuestDb,
    rules: ProgressRules,
    catalog: AchievementCatalog,
    notifier: Arc<dyn Notifier>,
}

impl CompletionOrchestrator {
    pub fn new(
        db: QuestDb,
        rules: ProgressRules,
        catalog: AchievementCatalog,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            rules,
            catalog,
            notifier,
        }
    }

    pub fn rules(&self) -> &ProgressRules {
        &self.rules
    }

    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    /// Normalize an inbound payload and apply it
    pub fn handle_inbound(
        &self,
        event: InboundEvent,
        received_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome, CompletionError> {
        let event = event.normalize(received_at)?;
        self.complete(&event)
    }

    /// Apply one completion. Returns after the transaction has committed.
    pub fn complete(&self, event: &CompletionEvent) -> Result<CompletionOutcome, CompletionError> {
        let now = Utc::now();
        let committed = self
            .db
            .write_transaction(|tx| self.apply_in_transaction(tx, event))?;

        match committed {
            Committed::Duplicate(current) => {
                info!(
                    "[quest:complete] Duplicate completion of {} for {}, nothing awarded",
                    event.task_id, event.user_id
                );
                Ok(self.duplicate_outcome(event, current))
            }
            Committed::Applied {
                advance,
                previous_streak,
                unlocked,
                settings,
            } => {
                info!(
                    "[quest:complete] {} completed {} (+{} XP, level {}, streak {})",
                    event.user_id,
                    event.task_id,
                    advance.xp_awarded,
                    advance.level_after,
                    advance.streak.current
                );

                let notifications =
                    self.notifications_for(&advance, previous_streak, &unlocked, &settings, now);
                let sent = notify::dispatch(self.notifier.as_ref(), &notifications);

                Ok(self.applied_outcome(event, &advance, unlocked, sent))
            }
        }
    }

    fn apply_in_transaction(
        &self,
        tx: &rusqlite::Transaction<'_>,
        event: &CompletionEvent,
    ) -> Result<Committed, StoreError> {
        let user_id = event.user_id.as_str();
        let before =
            progress::load_progress(tx, user_id)?.unwrap_or_else(|| UserProgress::new(user_id));

        if progress::history_contains(tx, user_id, &event.task_id, event.occurred_at)? {
            return Ok(Committed::Duplicate(before));
        }

        let mut advance = engine::advance(&self.rules, &before, event);

        let day = day_bucket(&self.rules.streak, event.occurred_at);
        let tasks_today = progress::completions_on_day(tx, user_id, &day)?.saturating_add(1);
        let already_unlocked = progress::unlocked_keys(tx, user_id)?;

        let ctx = AchievementContext {
            progress: &advance.progress,
            level: advance.level_after,
            completed_at_local: Some(self.rules.streak.local_datetime(event.occurred_at)),
            completed_on_weekend: Some(self.rules.streak.is_weekend(event.occurred_at)),
            tasks_today: Some(tasks_today),
        };
        let newly = check_achievements(&self.catalog, &ctx, &already_unlocked);

        let unlocks: Vec<AchievementUnlock> = newly
            .iter()
            .map(|def| AchievementUnlock {
                user_id: user_id.to_string(),
                achievement_key: def.key.clone(),
                unlocked_at: event.occurred_at,
            })
            .collect();
        let unlocked: Vec<NewAchievement> = newly
            .iter()
            .map(|def| NewAchievement {
                key: def.key.clone(),
                name: def.name.clone(),
                description: def.description.clone(),
                rarity: def.rarity,
            })
            .collect();

        let rank_title = self.rules.levels.rank_title(advance.level_after);
        let version = progress::save_progress(
            tx,
            &advance.progress,
            advance.level_after,
            rank_title,
            Utc::now(),
        )?;
        advance.progress.version = version;

        progress::insert_history(
            tx,
            &HistoryEntry {
                user_id: user_id.to_string(),
                task_id: event.task_id.clone(),
                task_title: event.task_title.clone(),
                priority: event.priority,
                xp_awarded: advance.xp_awarded,
                streak_after: advance.streak.current,
                level_after: advance.level_after,
                completed_at: event.occurred_at,
            },
            &day,
        )?;
        progress::insert_unlocks(tx, &unlocks)?;

        let settings = settings::load_settings(tx, user_id)?;
        debug!(
            "[quest:complete] {} now at version {} with {} new achievement(s)",
            user_id,
            version,
            unlocked.len()
        );

        Ok(Committed::Applied {
            advance: Box::new(advance),
            previous_streak: before.current_streak,
            unlocked,
            settings,
        })
    }

    fn notifications_for(
        &self,
        advance: &Advance,
        previous_streak: u32,
        unlocked: &[NewAchievement],
        settings: &UserSettings,
        now: DateTime<Utc>,
    ) -> Vec<Notification> {
        let user_id = advance.progress.user_id.as_str();
        let mut out = Vec::new();

        if settings.notify_achievements {
            for achievement in unlocked {
                out.push(Notification::new(
                    NotificationKind::AchievementUnlocked,
                    user_id,
                    json!({
                        "key": achievement.key,
                        "name": achievement.name,
                        "description": achievement.description,
                        "rarity": achievement.rarity,
                    }),
                    now,
                ));
            }
        }

        if settings.notify_level_up && advance.leveled_up() {
            out.push(Notification::new(
                NotificationKind::LevelUp,
                user_id,
                json!({
                    "previous_level": advance.level_before,
                    "new_level": advance.level_after,
                    "rank_title": self.rules.levels.rank_title(advance.level_after),
                    "lifetime_xp": advance.progress.lifetime_xp,
                }),
                now,
            ));
        }

        // A streak of 2+ that lapsed before this completion
        if settings.notify_streak_reminder
            && advance.streak.transition == StreakTransition::Reset
            && previous_streak > 1
        {
            out.push(Notification::new(
                NotificationKind::StreakReminder,
                user_id,
                json!({
                    "reason": "streak_lost",
                    "previous_streak": previous_streak,
                    "current_streak": advance.streak.current,
                    "longest_streak": advance.streak.longest,
                }),
                now,
            ));
        }

        out
    }

    fn applied_outcome(
        &self,
        event: &CompletionEvent,
        advance: &Advance,
        new_achievements: Vec<NewAchievement>,
        notifications_sent: usize,
    ) -> CompletionOutcome {
        let info = self.rules.levels.info(advance.progress.lifetime_xp);
        CompletionOutcome {
            user_id: event.user_id.clone(),
            task_id: event.task_id.clone(),
            duplicate: false,
            xp_awarded: advance.xp_awarded,
            lifetime_xp: advance.progress.lifetime_xp,
            level: advance.level_after,
            previous_level: advance.level_before,
            leveled_up: advance.leveled_up(),
            rank_title: info.rank_title,
            progress_percent: info.progress_percent,
            current_streak: advance.streak.current,
            longest_streak: advance.streak.longest,
            streak_transition: Some(advance.streak.transition),
            streak_deadline: advance
                .progress
                .last_completion_at
                .map(|last| self.rules.streak.grace_deadline(last)),
            new_achievements,
            notifications_sent,
        }
    }

    fn duplicate_outcome(
        &self,
        event: &CompletionEvent,
        current: UserProgress,
    ) -> CompletionOutcome {
        let info = self.rules.levels.info(current.lifetime_xp);
        CompletionOutcome {
            user_id: event.user_id.clone(),
            task_id: event.task_id.clone(),
            duplicate: true,
            xp_awarded: 0,
            lifetime_xp: current.lifetime_xp,
            level: info.level,
            previous_level: info.level,
            leveled_up: false,
            rank_title: info.rank_title,
            progress_percent: info.progress_percent,
            current_streak: current.current_streak,
            longest_streak: current.longest_streak,
            streak_transition: None,
            streak_deadline: current
                .last_completion_at
                .map(|last| self.rules.streak.grace_deadline(last)),
            new_achievements: Vec::new(),
            notifications_sent: 0,
        }
    }
}
