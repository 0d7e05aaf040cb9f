//! Domain error types
//!
//! Validation failures are caller contract violations and are reported as
//! `QuestError`. Application plumbing (config, CLI, server startup) uses
//! `anyhow` instead.

/// Errors raised when input does not satisfy the engine's contract
#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    #[error("Invalid priority: {0} (expected low, medium or high)")]
    InvalidPriority(String),

    #[error("Invalid iCalendar priority: {0} (expected 0-9)")]
    InvalidIcalPriority(i64),

    #[error("Streak length must be non-negative, got {0}")]
    NegativeStreak(i64),

    #[error("XP amount must be non-negative, got {0}")]
    NegativeXp(i64),

    #[error("Level must be at least 1, got {0}")]
    InvalidLevel(i64),

    #[error("{field} is too large: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Duplicate achievement key: {0}")]
    DuplicateAchievement(String),
}

/// Reject negative or oversized streak lengths coming from untyped input
pub fn validate_streak(streak: i64) -> Result<u32, QuestError> {
    if streak < 0 {
        return Err(QuestError::NegativeStreak(streak));
    }
    u32::try_from(streak).map_err(|_| QuestError::OutOfRange {
        field: "streak",
        value: streak,
    })
}

/// Reject negative XP amounts coming from untyped input
pub fn validate_xp(xp: i64) -> Result<u64, QuestError> {
    u64::try_from(xp).map_err(|_| QuestError::NegativeXp(xp))
}

/// Reject levels below 1 coming from untyped input
pub fn validate_level(level: i64) -> Result<u32, QuestError> {
    if level < 1 {
        return Err(QuestError::InvalidLevel(level));
    }
    u32::try_from(level).map_err(|_| QuestError::OutOfRange {
        field: "level",
        value: level,
    })
}
