//! Read-only projections for the CLI reports and the HTTP API

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use super::db::QuestDb;
use super::progress::{load_history, load_progress, load_unlocks};
use super::settings::load_settings;
use super::time_bucket::from_millis;
use crate::domain::{HistoryEntry, UserProgress, UserSettings};
use crate::engine::achievements::{AchievementCatalog, Rarity};
use crate::engine::{LevelInfo, ProgressRules, StreakPolicy, StreakState};

/// Largest page the history and leaderboard queries return
pub const MAX_PAGE: usize = 500;

/// Stats card for one user
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub user_id: String,
    #[serde(flatten)]
    pub level: LevelInfo,
    /// Streak as of the query time; 0 once the grace window has passed
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak: StreakState,
    pub tasks_completed: u64,
    pub high_priority_completed: u64,
    pub last_completion_at: Option<DateTime<Utc>>,
    pub achievements_unlocked: usize,
    pub achievements_total: usize,
}

/// A catalog entry with the user's unlock state
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    pub key: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub unlocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub user_id: String,
    pub level: u32,
    pub rank_title: String,
    pub lifetime_xp: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Per-user totals for one local day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub user_id: String,
    pub tasks: u32,
    pub xp: u64,
}

/// Query interface over the quest database
#[derive(Clone)]
pub struct QuestQuery {
    db: QuestDb,
}

impl QuestQuery {
    pub fn new(db: QuestDb) -> Self {
        Self { db }
    }

    /// Stored progress, or the zero state for an unknown user
    pub fn progress(&self, user_id: &str) -> Result<UserProgress> {
        let conn = self.db.conn();
        Ok(load_progress(&conn, user_id)?.unwrap_or_else(|| UserProgress::new(user_id)))
    }

    pub fn user_stats(
        &self,
        rules: &ProgressRules,
        catalog: &AchievementCatalog,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserStats> {
        let progress = self.progress(user_id)?;
        let unlocked: usize = self.db.conn().query_row(
            "SELECT COUNT(*) FROM achievements WHERE user_id = ?1",
            [user_id],
            |r| r.get(0),
        )?;

        let last = progress.last_completion_at;
        let streak = rules.streak.state(progress.current_streak, last, now);
        let current_streak = rules
            .streak
            .effective_streak(progress.current_streak, last, now);

        Ok(UserStats {
            level: rules.levels.info(progress.lifetime_xp),
            current_streak,
            longest_streak: progress.longest_streak,
            streak,
            tasks_completed: progress.tasks_completed,
            high_priority_completed: progress.high_priority_completed,
            last_completion_at: progress.last_completion_at,
            achievements_unlocked: unlocked,
            achievements_total: catalog.len(),
            user_id: progress.user_id,
        })
    }

    /// Every catalog entry, in catalog order, with its unlock time if unlocked.
    ///
    /// Unlocks whose key is no longer in the catalog are listed at the end.
    pub fn achievements(
        &self,
        catalog: &AchievementCatalog,
        user_id: &str,
    ) -> Result<Vec<AchievementStatus>> {
        let unlocks = load_unlocks(&self.db.conn(), user_id)?;
        let unlocked_at = |key: &str| {
            unlocks
                .iter()
                .find(|u| u.achievement_key == key)
                .map(|u| u.unlocked_at)
        };

        let mut statuses: Vec<AchievementStatus> = catalog
            .definitions()
            .iter()
            .map(|def| AchievementStatus {
                key: def.key.clone(),
                name: def.name.clone(),
                description: def.description.clone(),
                icon: def.icon.clone(),
                rarity: def.rarity,
                unlocked_at: unlocked_at(&def.key),
            })
            .collect();

        for unlock in unlocks.iter().filter(|u| catalog.get(&u.achievement_key).is_none()) {
            statuses.push(AchievementStatus {
                key: unlock.achievement_key.clone(),
                name: unlock.achievement_key.clone(),
                description: String::new(),
                icon: String::new(),
                rarity: Rarity::Common,
                unlocked_at: Some(unlock.unlocked_at),
            });
        }

        Ok(statuses)
    }

    pub fn history(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        let conn = self.db.conn();
        Ok(load_history(&conn, user_id, limit.min(MAX_PAGE))?)
    }

    /// Top users by lifetime XP, skipping users who opted out.
    ///
    /// Streaks past their grace window show as 0.
    pub fn leaderboard(
        &self,
        policy: &StreakPolicy,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT p.user_id, p.level, p.rank_title, p.lifetime_xp,
                      p.current_streak, p.longest_streak, p.last_completion_at
               FROM user_progress p
               LEFT JOIN user_settings s ON s.user_id = p.user_id
               WHERE COALESCE(s.show_on_leaderboard, 1) = 1
               ORDER BY p.lifetime_xp DESC, p.user_id ASC
               LIMIT ?1"#,
        )?;

        let rows = stmt.query_map([limit.min(MAX_PAGE) as i64], |row| {
            let stored_streak: u32 = row.get(4)?;
            let last: Option<i64> = row.get(6)?;
            Ok(LeaderboardEntry {
                position: 0,
                user_id: row.get(0)?,
                level: row.get(1)?,
                rank_title: row.get(2)?,
                lifetime_xp: row.get(3)?,
                current_streak: policy.effective_streak(stored_streak, last.map(from_millis), now),
                longest_streak: row.get(5)?,
            })
        })?;

        let mut entries = Vec::new();
        for (i, row) in rows.enumerate() {
            let mut entry = row?;
            entry.position = i + 1;
            entries.push(entry);
        }
        Ok(entries)
    }

    pub fn settings(&self, user_id: &str) -> Result<UserSettings> {
        Ok(load_settings(&self.db.conn(), user_id)?)
    }

    /// Totals per user for a local day bucket
    pub fn daily_totals(&self, day: &str) -> Result<Vec<DailyTotal>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT user_id, COUNT(*), COALESCE(SUM(xp_awarded), 0)
               FROM completion_history
               WHERE day_bucket = ?1
               GROUP BY user_id
               ORDER BY user_id"#,
        )?;
        let totals = stmt
            .query_map(params![day], |row| {
                Ok(DailyTotal {
                    user_id: row.get(0)?,
                    tasks: row.get(1)?,
                    xp: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(totals)
    }
}
