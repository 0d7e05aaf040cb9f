use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Priority;

/// Per-user gamification state
///
/// Mutated only by the completion flow. `longest_streak >= current_streak`
/// holds for every value the engine produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub lifetime_xp: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completion_at: Option<DateTime<Utc>>,
    pub tasks_completed: u64,
    pub high_priority_completed: u64,
    /// Compare-and-swap token, bumped on every persisted update
    #[serde(skip)]
    pub version: u64,
}

impl UserProgress {
    /// Zero state for a user that has never completed a task
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            lifetime_xp: 0,
            current_streak: 0,
            longest_streak: 0,
            last_completion_at: None,
            tasks_completed: 0,
            high_priority_completed: 0,
            version: 0,
        }
    }
}

/// A single unlocked achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlock {
    pub user_id: String,
    pub achievement_key: String,
    pub unlocked_at: DateTime<Utc>,
}

/// One row of a user's completion history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_id: String,
    pub task_id: String,
    pub task_title: String,
    pub priority: Priority,
    pub xp_awarded: u32,
    pub streak_after: u32,
    pub level_after: u32,
    pub completed_at: DateTime<Utc>,
}

/// Per-user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default = "default_true")]
    pub notify_level_up: bool,
    #[serde(default = "default_true")]
    pub notify_achievements: bool,
    #[serde(default = "default_true")]
    pub notify_streak_reminder: bool,
    #[serde(default = "default_true")]
    pub notify_daily_summary: bool,
    #[serde(default = "default_true")]
    pub show_on_leaderboard: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notify_level_up: true,
            notify_achievements: true,
            notify_streak_reminder: true,
            notify_daily_summary: true,
            show_on_leaderboard: true,
        }
    }
}
