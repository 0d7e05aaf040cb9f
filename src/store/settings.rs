//! Per-user settings rows

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::time_bucket::to_millis;
use crate::domain::UserSettings;

/// Stored settings, or the defaults when the user never saved any
pub fn load_settings(conn: &Connection, user_id: &str) -> rusqlite::Result<UserSettings> {
    let stored = conn
        .query_row(
            "SELECT notify_level_up, notify_achievements, notify_streak_reminder,
                    notify_daily_summary, show_on_leaderboard
             FROM user_settings WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(UserSettings {
                    notify_level_up: row.get(0)?,
                    notify_achievements: row.get(1)?,
                    notify_streak_reminder: row.get(2)?,
                    notify_daily_summary: row.get(3)?,
                    show_on_leaderboard: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(stored.unwrap_or_default())
}

pub fn save_settings(
    conn: &Connection,
    user_id: &str,
    settings: &UserSettings,
    now: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"INSERT INTO user_settings
           (user_id, notify_level_up, notify_achievements, notify_streak_reminder,
            notify_daily_summary, show_on_leaderboard, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(user_id) DO UPDATE SET
             notify_level_up = excluded.notify_level_up,
             notify_achievements = excluded.notify_achievements,
             notify_streak_reminder = excluded.notify_streak_reminder,
             notify_daily_summary = excluded.notify_daily_summary,
             show_on_leaderboard = excluded.show_on_leaderboard,
             updated_at = excluded.updated_at"#,
        params![
            user_id,
            settings.notify_level_up,
            settings.notify_achievements,
            settings.notify_streak_reminder,
            settings.notify_daily_summary,
            settings.show_on_leaderboard,
            to_millis(now),
        ],
    )?;
    Ok(())
}
