//! XP awards for completed tasks
//!
//! `xp = floor((base + priority_bonus) * multiplier)` where the multiplier
//! grows with the streak and is capped. Multipliers are kept in integer
//! percent so the floor is exact.

use serde::{Deserialize, Serialize};

use crate::domain::Priority;

/// XP award parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpRules {
    /// XP for any completed task
    #[serde(default = "default_base_xp")]
    pub base_xp: u32,

    #[serde(default)]
    pub low_bonus: u32,

    #[serde(default = "default_medium_bonus")]
    pub medium_bonus: u32,

    #[serde(default = "default_high_bonus")]
    pub high_bonus: u32,

    /// Multiplier growth per streak day, in percent (10 = +0.1x)
    #[serde(default = "default_streak_step_percent")]
    pub streak_step_percent: u32,

    /// Upper bound of the multiplier, in percent (200 = 2.0x)
    #[serde(default = "default_streak_cap_percent")]
    pub streak_cap_percent: u32,
}

fn default_base_xp() -> u32 {
    10
}

fn default_medium_bonus() -> u32 {
    5
}

fn default_high_bonus() -> u32 {
    10
}

fn default_streak_step_percent() -> u32 {
    10
}

fn default_streak_cap_percent() -> u32 {
    200
}

impl Default for XpRules {
    fn default() -> Self {
        Self {
            base_xp: default_base_xp(),
            low_bonus: 0,
            medium_bonus: default_medium_bonus(),
            high_bonus: default_high_bonus(),
            streak_step_percent: default_streak_step_percent(),
            streak_cap_percent: default_streak_cap_percent(),
        }
    }
}

impl XpRules {
    pub fn priority_bonus(&self, priority: Priority) -> u32 {
        match priority {
            Priority::Low => self.low_bonus,
            Priority::Medium => self.medium_bonus,
            Priority::High => self.high_bonus,
        }
    }

    /// Streak multiplier in percent, never below 100
    pub fn streak_multiplier_percent(&self, streak: u32) -> u32 {
        let cap = self.streak_cap_percent.max(100);
        self.streak_step_percent
            .saturating_mul(streak)
            .saturating_add(100)
            .min(cap)
    }

    /// XP awarded for one completion at the given streak length
    pub fn calculate_xp(&self, priority: Priority, streak: u32) -> u32 {
        let raw = u64::from(self.base_xp) + u64::from(self.priority_bonus(priority));
        let percent = u64::from(self.streak_multiplier_percent(streak));
        u32::try_from(raw * percent / 100).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_xp_by_priority() {
        let rules = XpRules::default();
        assert_eq!(rules.calculate_xp(Priority::Low, 0), 10);
        assert_eq!(rules.calculate_xp(Priority::Medium, 0), 15);
        assert_eq!(rules.calculate_xp(Priority::High, 0), 20);
    }

    #[test]
    fn test_streak_multiplier_floors() {
        let rules = XpRules::default();
        // 15 * 1.5 = 22.5
        assert_eq!(rules.calculate_xp(Priority::Medium, 5), 22);
        // 10 * 1.3 = 13
        assert_eq!(rules.calculate_xp(Priority::Low, 3), 13);
    }

    #[test]
    fn test_multiplier_capped_at_two() {
        let rules = XpRules::default();
        assert_eq!(rules.streak_multiplier_percent(10), 200);
        assert_eq!(rules.streak_multiplier_percent(u32::MAX), 200);
        assert_eq!(rules.calculate_xp(Priority::High, 10), 40);
        assert_eq!(rules.calculate_xp(Priority::High, 20), 40);
    }

    #[test]
    fn test_cap_below_one_is_ignored() {
        let rules = XpRules {
            streak_cap_percent: 50,
            ..XpRules::default()
        };
        assert_eq!(rules.calculate_xp(Priority::Low, 7), 10);
    }
}
