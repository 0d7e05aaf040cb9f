use serde::{Deserialize, Serialize};

use crate::error::QuestError;

/// Priority of a completed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Map an iCalendar `PRIORITY` value (RFC 5545, 0-9) onto the three tiers.
    ///
    /// 1-4 is high, 5 is medium, 6-9 is low. 0 means "undefined" and counts as low.
    pub fn from_ical(value: i64) -> Result<Self, QuestError> {
        match value {
            1..=4 => Ok(Priority::High),
            5 => Ok(Priority::Medium),
            0 | 6..=9 => Ok(Priority::Low),
            other => Err(QuestError::InvalidIcalPriority(other)),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(QuestError::InvalidPriority(s.to_string())),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
