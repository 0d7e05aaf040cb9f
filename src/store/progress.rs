//! Progress repository
//!
//! Row-level reads and writes used inside a completion transaction. Every
//! function takes a plain `&Connection` so it works on a
//! [`rusqlite::Transaction`] (which derefs to one) as well as on a locked
//! connection for read-only callers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::error::StoreError;
use super::time_bucket::{from_millis, to_millis};
use crate::domain::{AchievementUnlock, HistoryEntry, Priority, UserProgress};

const PROGRESS_COLUMNS: &str = "user_id, lifetime_xp, current_streak, longest_streak, \
     last_completion_at, tasks_completed, high_priority_completed, version";

fn row_to_progress(row: &Row<'_>) -> rusqlite::Result<UserProgress> {
    let last: Option<i64> = row.get(4)?;
    Ok(UserProgress {
        user_id: row.get(0)?,
        lifetime_xp: row.get(1)?,
        current_streak: row.get(2)?,
        longest_streak: row.get(3)?,
        last_completion_at: last.map(from_millis),
        tasks_completed: row.get(5)?,
        high_priority_completed: row.get(6)?,
        version: row.get(7)?,
    })
}

pub fn load_progress(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<UserProgress>> {
    conn.query_row(
        &format!("SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = ?1"),
        [user_id],
        row_to_progress,
    )
    .optional()
}

/// All users with a non-zero streak and a recorded completion
pub fn load_active_streaks(conn: &Connection) -> rusqlite::Result<Vec<UserProgress>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM user_progress
         WHERE current_streak > 0 AND last_completion_at IS NOT NULL
         ORDER BY user_id"
    ))?;
    stmt.query_map([], row_to_progress)?.collect()
}

/// Write `progress` if the stored row is still at `progress.version`.
///
/// Version 0 means "no row yet" and inserts. Returns the new version.
pub fn save_progress(
    conn: &Connection,
    progress: &UserProgress,
    level: u32,
    rank_title: &str,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let last = progress.last_completion_at.map(to_millis);
    let next_version = progress.version + 1;

    let changed = if progress.version == 0 {
        conn.execute(
            r#"INSERT INTO user_progress
               (user_id, lifetime_xp, level, rank_title, current_streak, longest_streak,
                last_completion_at, tasks_completed, high_priority_completed, version, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
               ON CONFLICT(user_id) DO NOTHING"#,
            params![
                progress.user_id,
                progress.lifetime_xp,
                level,
                rank_title,
                progress.current_streak,
                progress.longest_streak,
                last,
                progress.tasks_completed,
                progress.high_priority_completed,
                next_version,
                to_millis(now),
            ],
        )?
    } else {
        conn.execute(
            r#"UPDATE user_progress SET
                 lifetime_xp = ?2, level = ?3, rank_title = ?4,
                 current_streak = ?5, longest_streak = ?6, last_completion_at = ?7,
                 tasks_completed = ?8, high_priority_completed = ?9,
                 version = ?10, updated_at = ?11
               WHERE user_id = ?1 AND version = ?12"#,
            params![
                progress.user_id,
                progress.lifetime_xp,
                level,
                rank_title,
                progress.current_streak,
                progress.longest_streak,
                last,
                progress.tasks_completed,
                progress.high_priority_completed,
                next_version,
                to_millis(now),
                progress.version,
            ],
        )?
    };

    if changed == 0 {
        return Err(StoreError::Conflict {
            user_id: progress.user_id.clone(),
            expected: progress.version,
        });
    }
    Ok(next_version)
}

pub fn unlocked_keys(conn: &Connection, user_id: &str) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT achievement_key FROM achievements WHERE user_id = ?1")?;
    stmt.query_map([user_id], |row| row.get(0))?.collect()
}

/// Unlocked achievements, oldest first
pub fn load_unlocks(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<AchievementUnlock>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, achievement_key, unlocked_at FROM achievements
         WHERE user_id = ?1 ORDER BY unlocked_at, rowid",
    )?;
    stmt.query_map([user_id], |row| {
        Ok(AchievementUnlock {
            user_id: row.get(0)?,
            achievement_key: row.get(1)?,
            unlocked_at: from_millis(row.get(2)?),
        })
    })?
    .collect()
}

/// Append unlocks; a pair that is already unlocked keeps its original time
pub fn insert_unlocks(conn: &Connection, unlocks: &[AchievementUnlock]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO achievements (user_id, achievement_key, unlocked_at)
         VALUES (?1, ?2, ?3)",
    )?;
    for unlock in unlocks {
        stmt.execute(params![
            unlock.user_id,
            unlock.achievement_key,
            to_millis(unlock.unlocked_at)
        ])?;
    }
    Ok(())
}

/// Whether this exact completion was already awarded
pub fn history_contains(
    conn: &Connection,
    user_id: &str,
    task_id: &str,
    completed_at: DateTime<Utc>,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM completion_history
                       WHERE user_id = ?1 AND task_id = ?2 AND completed_at = ?3)",
        params![user_id, task_id, to_millis(completed_at)],
        |row| row.get(0),
    )
}

pub fn insert_history(conn: &Connection, entry: &HistoryEntry, day: &str) -> rusqlite::Result<()> {
    conn.execute(
        r#"INSERT INTO completion_history
           (user_id, task_id, task_title, priority, xp_awarded, streak_after, level_after,
            completed_at, day_bucket)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
        params![
            entry.user_id,
            entry.task_id,
            entry.task_title,
            entry.priority.as_str(),
            entry.xp_awarded,
            entry.streak_after,
            entry.level_after,
            to_millis(entry.completed_at),
            day,
        ],
    )?;
    Ok(())
}

/// Most recent completions first
pub fn load_history(
    conn: &Connection,
    user_id: &str,
    limit: usize,
) -> rusqlite::Result<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, task_id, task_title, priority, xp_awarded, streak_after, level_after,
                completed_at
         FROM completion_history WHERE user_id = ?1
         ORDER BY completed_at DESC, id DESC LIMIT ?2",
    )?;
    stmt.query_map(params![user_id, limit as i64], |row| {
        let priority: String = row.get(3)?;
        Ok(HistoryEntry {
            user_id: row.get(0)?,
            task_id: row.get(1)?,
            task_title: row.get(2)?,
            // Rows are only written from parsed priorities
            priority: priority.parse().unwrap_or(Priority::Low),
            xp_awarded: row.get(4)?,
            streak_after: row.get(5)?,
            level_after: row.get(6)?,
            completed_at: from_millis(row.get(7)?),
        })
    })?
    .collect()
}

/// Completions already recorded for `user_id` in a local day bucket
pub fn completions_on_day(conn: &Connection, user_id: &str, day: &str) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM completion_history WHERE user_id = ?1 AND day_bucket = ?2",
        params![user_id, day],
        |row| row.get(0),
    )
}
