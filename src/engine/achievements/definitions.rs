//! Achievement definitions and unlock conditions
//!
//! The standard catalog is built here. Hosts can assemble their own catalog
//! from [`AchievementDefinition`]s, including custom predicates.

use std::collections::HashSet;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::UserProgress;
use crate::error::QuestError;

/// How rare an achievement is, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

/// Everything a condition can look at
///
/// `progress` is the snapshot after the current completion was applied.
/// The completion fields are None when evaluating outside a completion.
#[derive(Debug, Clone)]
pub struct AchievementContext<'a> {
    pub progress: &'a UserProgress,
    pub level: u32,
    /// Local wall-clock time of the completion
    pub completed_at_local: Option<NaiveDateTime>,
    pub completed_on_weekend: Option<bool>,
    /// Completions on the local day of this completion, including it
    pub tasks_today: Option<u32>,
}

/// A condition that could not be evaluated
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConditionError {
    #[error("Missing context: {0}")]
    MissingContext(&'static str),

    #[error("Condition failed: {0}")]
    Failed(String),
}

/// Custom predicate signature
pub type ConditionFn = fn(&AchievementContext<'_>) -> Result<bool, ConditionError>;

/// Predicate deciding whether an achievement is earned
#[derive(Debug, Clone)]
pub enum UnlockCondition {
    TasksCompleted(u64),
    StreakReached(u32),
    LevelReached(u32),
    LifetimeXp(u64),
    HighPriorityCompleted(u64),
    TasksInOneDay(u32),
    /// Completed before this local hour (exclusive)
    CompletedBeforeHour(u32),
    /// Completed at or after this local hour
    CompletedFromHour(u32),
    CompletedOnWeekend,
    Custom(ConditionFn),
}

impl UnlockCondition {
    pub fn evaluate(&self, ctx: &AchievementContext<'_>) -> Result<bool, ConditionError> {
        let progress = ctx.progress;
        match self {
            Self::TasksCompleted(n) => Ok(progress.tasks_completed >= *n),
            Self::StreakReached(n) => Ok(progress.current_streak >= *n),
            Self::LevelReached(n) => Ok(ctx.level >= *n),
            Self::LifetimeXp(n) => Ok(progress.lifetime_xp >= *n),
            Self::HighPriorityCompleted(n) => Ok(progress.high_priority_completed >= *n),
            Self::TasksInOneDay(n) => ctx
                .tasks_today
                .map(|count| count >= *n)
                .ok_or(ConditionError::MissingContext("tasks_today")),
            Self::CompletedBeforeHour(hour) => Ok(ctx
                .completed_at_local
                .is_some_and(|t| t.hour() < *hour)),
            Self::CompletedFromHour(hour) => Ok(ctx
                .completed_at_local
                .is_some_and(|t| t.hour() >= *hour)),
            Self::CompletedOnWeekend => Ok(ctx.completed_on_weekend.unwrap_or(false)),
            Self::Custom(predicate) => predicate(ctx),
        }
    }
}

/// A one-time unlockable achievement
#[derive(Debug, Clone)]
pub struct AchievementDefinition {
    pub key: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub condition: UnlockCondition,
}

impl AchievementDefinition {
    pub fn new(
        key: &str,
        name: &str,
        description: &str,
        icon: &str,
        rarity: Rarity,
        condition: UnlockCondition,
    ) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            rarity,
            condition,
        }
    }
}

/// Ordered, read-only set of achievement definitions with unique keys
#[derive(Debug, Clone)]
pub struct AchievementCatalog {
    definitions: Vec<AchievementDefinition>,
}

impl AchievementCatalog {
    pub fn new(definitions: Vec<AchievementDefinition>) -> Result<Self, QuestError> {
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.key.clone()) {
                return Err(QuestError::DuplicateAchievement(def.key.clone()));
            }
        }
        Ok(Self { definitions })
    }

    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    pub fn get(&self, key: &str) -> Option<&AchievementDefinition> {
        self.definitions.iter().find(|d| d.key == key)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The built-in catalog
    pub fn standard() -> Self {
        use Rarity::*;
        use UnlockCondition::*;

        let definitions = vec![
            // === MILESTONE ===
            AchievementDefinition::new(
                "first_task",
                "First Steps",
                "Complete your first task",
                "🎯",
                Common,
                TasksCompleted(1),
            ),
            AchievementDefinition::new(
                "tasks_10",
                "Getting Started",
                "Complete 10 tasks",
                "📈",
                Common,
                TasksCompleted(10),
            ),
            AchievementDefinition::new(
                "tasks_50",
                "Productive",
                "Complete 50 tasks",
                "💪",
                Rare,
                TasksCompleted(50),
            ),
            AchievementDefinition::new(
                "tasks_100",
                "Century",
                "Complete 100 tasks",
                "💯",
                Rare,
                TasksCompleted(100),
            ),
            AchievementDefinition::new(
                "tasks_500",
                "Veteran",
                "Complete 500 tasks",
                "🏅",
                Epic,
                TasksCompleted(500),
            ),
            AchievementDefinition::new(
                "tasks_1000",
                "Task Legend",
                "Complete 1000 tasks",
                "🏆",
                Legendary,
                TasksCompleted(1000),
            ),
            // === STREAK ===
            AchievementDefinition::new(
                "streak_3",
                "On a Roll",
                "Keep a 3-day streak",
                "🔥",
                Common,
                StreakReached(3),
            ),
            AchievementDefinition::new(
                "streak_7",
                "Week Warrior",
                "Keep a 7-day streak",
                "📅",
                Rare,
                StreakReached(7),
            ),
            AchievementDefinition::new(
                "streak_30",
                "Unstoppable",
                "Keep a 30-day streak",
                "⚡",
                Epic,
                StreakReached(30),
            ),
            AchievementDefinition::new(
                "streak_100",
                "Habit Master",
                "Keep a 100-day streak",
                "👑",
                Legendary,
                StreakReached(100),
            ),
            // === LEVEL ===
            AchievementDefinition::new(
                "level_5",
                "Rising Star",
                "Reach level 5",
                "⭐",
                Common,
                LevelReached(5),
            ),
            AchievementDefinition::new(
                "level_10",
                "Apprentice",
                "Reach level 10",
                "🌟",
                Rare,
                LevelReached(10),
            ),
            AchievementDefinition::new(
                "level_25",
                "Knighted",
                "Reach level 25",
                "🛡️",
                Epic,
                LevelReached(25),
            ),
            AchievementDefinition::new(
                "level_50",
                "Living Legend",
                "Reach level 50",
                "🐉",
                Legendary,
                LevelReached(50),
            ),
            // === XP ===
            AchievementDefinition::new(
                "xp_1000",
                "Thousand Points",
                "Earn 1,000 XP",
                "💎",
                Common,
                LifetimeXp(1_000),
            ),
            AchievementDefinition::new(
                "xp_10000",
                "XP Hoarder",
                "Earn 10,000 XP",
                "💰",
                Rare,
                LifetimeXp(10_000),
            ),
            // === PRIORITY ===
            AchievementDefinition::new(
                "high_priority_10",
                "Firefighter",
                "Complete 10 high-priority tasks",
                "🚒",
                Common,
                HighPriorityCompleted(10),
            ),
            AchievementDefinition::new(
                "high_priority_100",
                "Crisis Manager",
                "Complete 100 high-priority tasks",
                "🚨",
                Rare,
                HighPriorityCompleted(100),
            ),
            // === DAILY ===
            AchievementDefinition::new(
                "busy_day",
                "Busy Day",
                "Complete 5 tasks in one day",
                "🐝",
                Rare,
                TasksInOneDay(5),
            ),
            // === TIME ===
            AchievementDefinition::new(
                "early_bird",
                "Early Bird",
                "Complete a task before 7 AM",
                "🐦",
                Common,
                CompletedBeforeHour(7),
            ),
            AchievementDefinition::new(
                "night_owl",
                "Night Owl",
                "Complete a task after 10 PM",
                "🦉",
                Common,
                CompletedFromHour(22),
            ),
            AchievementDefinition::new(
                "weekend_warrior",
                "Weekend Warrior",
                "Complete a task on the weekend",
                "🏖️",
                Common,
                CompletedOnWeekend,
            ),
        ];

        Self { definitions }
    }
}

impl Default for AchievementCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_keys_unique() {
        let catalog = AchievementCatalog::standard();
        let rebuilt = AchievementCatalog::new(catalog.definitions().to_vec());
        assert!(rebuilt.is_ok());
        assert!(catalog.get("first_task").is_some());
        assert!(catalog.get("nope").is_none());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let def = AchievementDefinition::new(
            "dup",
            "Dup",
            "",
            "",
            Rarity::Common,
            UnlockCondition::TasksCompleted(1),
        );
        let result = AchievementCatalog::new(vec![def.clone(), def]);
        assert!(matches!(result, Err(QuestError::DuplicateAchievement(k)) if k == "dup"));
    }

    #[test]
    fn test_daily_condition_requires_context() {
        let progress = UserProgress::new("alice");
        let ctx = AchievementContext {
            progress: &progress,
            level: 1,
            completed_at_local: None,
            completed_on_weekend: None,
            tasks_today: None,
        };
        assert!(UnlockCondition::TasksInOneDay(5).evaluate(&ctx).is_err());
        assert!(!UnlockCondition::CompletedOnWeekend.evaluate(&ctx).unwrap());
    }
}
