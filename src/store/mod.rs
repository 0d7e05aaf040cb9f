//! SQLite persistence for quest
//!
//! Progress, unlocked achievements, completion history, user settings and
//! background job bookkeeping live in one database (`~/.quest/quest.db`).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │    completion    │     │  HTTP API / CLI  │     │  background jobs │
//! │ (write txn, CAS) │     │   (QuestQuery)   │     │ (snapshots, log) │
//! └────────┬─────────┘     └────────┬─────────┘     └────────┬─────────┘
//!          └────────────────────────┼────────────────────────┘
//!                                   ▼
//!                          ~/.quest/quest.db
//! ```
//!
//! Writes to `user_progress` only happen inside
//! [`QuestDb::write_transaction`], using the functions in [`progress`].

mod db;
mod error;
pub mod job_log;
pub mod progress;
mod queries;
pub mod settings;
pub mod time_bucket;

pub use db::QuestDb;
pub use error::StoreError;
pub use queries::{
    AchievementStatus, DailyTotal, LeaderboardEntry, MAX_PAGE, QuestQuery, UserStats,
};
