//! Gamification engine: XP, levels, streaks and achievements
//!
//! Everything in here is pure. The rules are an immutable [`ProgressRules`]
//! value handed in by the caller, so tests and hosts can substitute their own
//! tables.

pub mod achievements;
mod levels;
mod streaks;
mod xp;

pub use levels::{LevelCurve, LevelInfo, LevelTable, RankTitle};
pub use streaks::{DayBoundary, StreakPolicy, StreakState, StreakTransition, StreakUpdate};
pub use xp::XpRules;

use crate::domain::{CompletionEvent, Priority, UserProgress};

/// All tunable rules of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRules {
    pub xp: XpRules,
    pub levels: LevelTable,
    pub streak: StreakPolicy,
}

impl Default for ProgressRules {
    fn default() -> Self {
        Self {
            xp: XpRules::default(),
            levels: LevelTable::default(),
            streak: StreakPolicy::default(),
        }
    }
}

impl ProgressRules {
    pub fn new(xp: XpRules, curve: &LevelCurve, streak: StreakPolicy) -> Self {
        Self {
            xp,
            levels: LevelTable::from_curve(curve),
            streak,
        }
    }
}

/// Outcome of applying one completion to a progress snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub progress: UserProgress,
    pub xp_awarded: u32,
    pub streak: StreakUpdate,
    pub level_before: u32,
    pub level_after: u32,
}

impl Advance {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Streak first, then XP at the new streak length, then level
pub fn advance(rules: &ProgressRules, before: &UserProgress, event: &CompletionEvent) -> Advance {
    let streak = rules.streak.apply(
        before.current_streak,
        before.longest_streak,
        before.last_completion_at,
        event.occurred_at,
    );

    let xp_awarded = rules.xp.calculate_xp(event.priority, streak.current);
    let level_before = rules.levels.level_for_xp(before.lifetime_xp);

    let mut progress = before.clone();
    progress.current_streak = streak.current;
    progress.longest_streak = streak.longest;
    progress.lifetime_xp = before.lifetime_xp.saturating_add(u64::from(xp_awarded));
    progress.tasks_completed += 1;
    if event.priority == Priority::High {
        progress.high_priority_completed += 1;
    }
    progress.last_completion_at = Some(match before.last_completion_at {
        Some(last) if last > event.occurred_at => last,
        _ => event.occurred_at,
    });

    let level_after = rules.levels.level_for_xp(progress.lifetime_xp);

    Advance {
        progress,
        xp_awarded,
        streak,
        level_before,
        level_after,
    }
}
