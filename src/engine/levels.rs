//! Level thresholds and rank titles
//!
//! Level `N` requires cumulative XP `T(N)`. `T(1) = 0`, the step to level 2
//! is `first_increment`, and each further step grows by `growth_percent`.
//! With the defaults: 0, 100, 250, 475, 812, ...

use serde::{Deserialize, Serialize};

/// Parameters of the level curve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCurve {
    #[serde(default = "default_first_increment")]
    pub first_increment: u64,

    /// Growth of each step over the previous one, in percent (150 = 1.5x)
    #[serde(default = "default_growth_percent")]
    pub growth_percent: u32,

    #[serde(default = "default_max_level")]
    pub max_level: u32,

    /// Rank titles, looked up by the highest `level` not above the player's level
    #[serde(default = "default_ranks")]
    pub ranks: Vec<RankTitle>,
}

/// A rank title that applies from `level` upwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTitle {
    pub level: u32,
    pub title: String,
}

fn default_first_increment() -> u64 {
    100
}

fn default_growth_percent() -> u32 {
    150
}

fn default_max_level() -> u32 {
    100
}

fn default_ranks() -> Vec<RankTitle> {
    [
        (1, "Task Novice"),
        (5, "Rising Star"),
        (10, "Quest Apprentice"),
        (15, "Task Warrior"),
        (20, "Achievement Hunter"),
        (25, "Productivity Knight"),
        (35, "Quest Champion"),
        (50, "Productivity Legend"),
        (75, "Grand Quest Master"),
        (100, "Legendary Quest Master"),
    ]
    .into_iter()
    .map(|(level, title)| RankTitle {
        level,
        title: title.to_string(),
    })
    .collect()
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            first_increment: default_first_increment(),
            growth_percent: default_growth_percent(),
            max_level: default_max_level(),
            ranks: default_ranks(),
        }
    }
}

/// Immutable level/rank lookup table built from a [`LevelCurve`]
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    /// `thresholds[n - 1] == T(n)`
    thresholds: Vec<u64>,
    /// Sorted by level
    ranks: Vec<RankTitle>,
}

/// Level standing derived from lifetime XP
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelInfo {
    pub level: u32,
    pub rank_title: String,
    pub lifetime_xp: u64,
    /// XP earned since reaching the current level
    pub current_xp: u64,
    /// `T(level)`
    pub level_xp: u64,
    /// `T(level + 1)`, None at max level
    pub next_level_xp: Option<u64>,
    /// 0.0 - 100.0
    pub progress_percent: f64,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::from_curve(&LevelCurve::default())
    }
}

impl LevelTable {
    pub fn from_curve(curve: &LevelCurve) -> Self {
        let max_level = curve.max_level.max(1) as usize;
        let mut thresholds = Vec::with_capacity(max_level);
        thresholds.push(0u64);

        let mut increment = curve.first_increment;
        for _ in 1..max_level {
            let previous = *thresholds.last().unwrap_or(&0);
            thresholds.push(previous.saturating_add(increment));
            increment = increment.saturating_mul(u64::from(curve.growth_percent)) / 100;
        }

        let mut ranks = curve.ranks.clone();
        ranks.sort_by_key(|r| r.level);

        Self { thresholds, ranks }
    }

    pub fn max_level(&self) -> u32 {
        self.thresholds.len() as u32
    }

    /// Largest level whose threshold is reached
    pub fn level_for_xp(&self, lifetime_xp: u64) -> u32 {
        let reached = self.thresholds.partition_point(|&t| t <= lifetime_xp);
        (reached as u32).max(1)
    }

    /// Cumulative XP required for `level` (clamped to the table)
    pub fn xp_for_level(&self, level: u32) -> u64 {
        let idx = (level.max(1) as usize - 1).min(self.thresholds.len() - 1);
        self.thresholds[idx]
    }

    /// Cumulative XP required for `level + 1` (None if `level` is the max)
    pub fn xp_for_next_level(&self, level: u32) -> Option<u64> {
        self.thresholds.get(level.max(1) as usize).copied()
    }

    pub fn rank_title(&self, level: u32) -> &str {
        self.ranks
            .iter()
            .rev()
            .find(|r| r.level <= level)
            .or_else(|| self.ranks.first())
            .map(|r| r.title.as_str())
            .unwrap_or("")
    }

    /// Progress through `level` given XP earned inside that level, as 0-100
    pub fn progress_to_next_level(&self, level: u32, current_xp: u64) -> f64 {
        let Some(next) = self.xp_for_next_level(level) else {
            return 100.0;
        };
        let span = next.saturating_sub(self.xp_for_level(level));
        if span == 0 {
            return 100.0;
        }
        (current_xp as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Full level standing for a lifetime XP total
    pub fn info(&self, lifetime_xp: u64) -> LevelInfo {
        let level = self.level_for_xp(lifetime_xp);
        let level_xp = self.xp_for_level(level);
        let current_xp = lifetime_xp - level_xp;

        LevelInfo {
            level,
            rank_title: self.rank_title(level).to_string(),
            lifetime_xp,
            current_xp,
            level_xp,
            next_level_xp: self.xp_for_next_level(level),
            progress_percent: self.progress_to_next_level(level, current_xp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        let table = LevelTable::default();
        let firsts: Vec<u64> = (1..=5).map(|l| table.xp_for_level(l)).collect();
        assert_eq!(firsts, vec![0, 100, 250, 475, 812]);
        assert_eq!(table.xp_for_next_level(1), Some(100));
        assert_eq!(table.xp_for_next_level(3), Some(475));
    }

    #[test]
    fn test_level_for_xp() {
        let table = LevelTable::default();
        assert_eq!(table.level_for_xp(0), 1);
        assert_eq!(table.level_for_xp(99), 1);
        assert_eq!(table.level_for_xp(100), 2);
        assert_eq!(table.level_for_xp(249), 2);
        assert_eq!(table.level_for_xp(250), 3);
        assert_eq!(table.level_for_xp(u64::MAX), table.max_level());
    }

    #[test]
    fn test_rank_titles() {
        let table = LevelTable::default();
        assert_eq!(table.rank_title(1), "Task Novice");
        assert_eq!(table.rank_title(4), "Task Novice");
        assert_eq!(table.rank_title(5), "Rising Star");
        assert_eq!(table.rank_title(12), "Quest Apprentice");
        assert_eq!(table.rank_title(25), "Productivity Knight");
        assert_eq!(table.rank_title(100), "Legendary Quest Master");
    }

    #[test]
    fn test_progress_within_level() {
        let table = LevelTable::default();
        // Level 2 spans 100 -> 250
        assert!((table.progress_to_next_level(2, 75) - 50.0).abs() < f64::EPSILON);
        assert_eq!(table.progress_to_next_level(2, 0), 0.0);
        assert_eq!(table.progress_to_next_level(2, 10_000), 100.0);
        assert_eq!(table.progress_to_next_level(table.max_level(), 0), 100.0);
    }

    #[test]
    fn test_info_for_lifetime_xp() {
        let table = LevelTable::default();
        let info = table.info(175);
        assert_eq!(info.level, 2);
        assert_eq!(info.current_xp, 75);
        assert_eq!(info.level_xp, 100);
        assert_eq!(info.next_level_xp, Some(250));
        assert!((info.progress_percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_curve() {
        let curve = LevelCurve {
            first_increment: 10,
            growth_percent: 100,
            max_level: 3,
            ranks: vec![RankTitle {
                level: 2,
                title: "Two".to_string(),
            }],
        };
        let table = LevelTable::from_curve(&curve);
        assert_eq!(table.xp_for_level(3), 20);
        assert_eq!(table.level_for_xp(1_000), 3);
        assert_eq!(table.xp_for_next_level(3), None);
        // Below the first rank threshold falls back to the first entry
        assert_eq!(table.rank_title(1), "Two");
    }
}
