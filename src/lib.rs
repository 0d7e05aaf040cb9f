//! Quest - gamification for completed tasks
//!
//! Quest awards XP for completed tasks and tracks daily streaks. Levels, rank
//! titles and achievements follow from that. Task hosts such as a CalDAV
//! server report completions; Quest keeps the per-user ledger in SQLite and
//! sends notifications.
//!
//! ## Layers
//!
//! 1. **engine**: pure XP, level, streak and achievement rules.
//! 2. **completion**: applies one completion atomically and notifies.
//! 3. **store**: SQLite persistence and read projections.
//! 4. **http_server** / **jobs**: the API for hosts and dashboards, and the
//!    streak reminder and daily summary jobs.

pub mod completion;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http_server;
pub mod jobs;
pub mod notify;
pub mod store;

pub use domain::*;
