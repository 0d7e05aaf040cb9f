//! SQLite database connection and schema management
//!
//! Manages the quest database (default `~/.quest/quest.db`) and creates its
//! schema on first open.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Shared database handle
#[derive(Clone)]
pub struct QuestDb {
    conn: Arc<Mutex<Connection>>,
}

impl QuestDb {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open quest db: {}", path.display()))?;

        // WAL lets the read API and background jobs read while a completion writes
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Self::from_connection(conn)
    }

    /// Throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Lock the connection
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a transaction open:
        // rusqlite rolls back when the Transaction is dropped during unwind.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` inside one IMMEDIATE transaction.
    ///
    /// The write lock is taken up front, so two writers for the same user are
    /// serialized. Commits on `Ok`, rolls back on `Err`.
    pub fn write_transaction<T, E>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn()
            .execute_batch(SCHEMA_SQL)
            .context("Failed to initialize quest schema")
    }
}

/// SQL schema for the quest database
const SCHEMA_SQL: &str = r#"
-- Per-user progress (one row per user)
CREATE TABLE IF NOT EXISTS user_progress (
    user_id TEXT PRIMARY KEY,
    lifetime_xp INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_completion_at INTEGER,
    tasks_completed INTEGER NOT NULL DEFAULT 0,
    high_priority_completed INTEGER NOT NULL DEFAULT 0,
    rank_title TEXT NOT NULL DEFAULT '',
    version INTEGER NOT NULL DEFAULT 0,
    updated_at INTEGER NOT NULL,
    CHECK (longest_streak >= current_streak)
);
CREATE INDEX IF NOT EXISTS idx_progress_xp ON user_progress(lifetime_xp);

-- Unlocked achievements (append-only)
CREATE TABLE IF NOT EXISTS achievements (
    user_id TEXT NOT NULL,
    achievement_key TEXT NOT NULL,
    unlocked_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, achievement_key)
);

-- Completion history (append-only, one row per awarded completion)
CREATE TABLE IF NOT EXISTS completion_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    task_id TEXT NOT NULL,
    task_title TEXT NOT NULL,
    priority TEXT NOT NULL,
    xp_awarded INTEGER NOT NULL,
    streak_after INTEGER NOT NULL,
    level_after INTEGER NOT NULL,
    completed_at INTEGER NOT NULL,
    day_bucket TEXT NOT NULL,
    UNIQUE (user_id, task_id, completed_at)
);
CREATE INDEX IF NOT EXISTS idx_history_user_day ON completion_history(user_id, day_bucket);
CREATE INDEX IF NOT EXISTS idx_history_day ON completion_history(day_bucket);

-- Per-user preferences
CREATE TABLE IF NOT EXISTS user_settings (
    user_id TEXT PRIMARY KEY,
    notify_level_up INTEGER NOT NULL DEFAULT 1,
    notify_achievements INTEGER NOT NULL DEFAULT 1,
    notify_streak_reminder INTEGER NOT NULL DEFAULT 1,
    notify_daily_summary INTEGER NOT NULL DEFAULT 1,
    show_on_leaderboard INTEGER NOT NULL DEFAULT 1,
    updated_at INTEGER NOT NULL
);

-- Background job runs, at most one per job, user and local day
CREATE TABLE IF NOT EXISTS job_log (
    job TEXT NOT NULL,
    user_id TEXT NOT NULL,
    day_bucket TEXT NOT NULL,
    ran_at INTEGER NOT NULL,
    PRIMARY KEY (job, user_id, day_bucket)
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
