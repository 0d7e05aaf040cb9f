//! Inbound completion events
//!
//! Hosts report completed tasks in different shapes. Every shape is a variant
//! of [`InboundEvent`] and is normalized into a single [`CompletionEvent`]
//! before it reaches the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Priority;
use crate::error::QuestError;

const UNTITLED_TASK: &str = "Untitled task";
const PRINCIPAL_PREFIX: &str = "principals/users/";

/// A normalized "task completed" event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub task_id: String,
    pub user_id: String,
    pub task_title: String,
    pub priority: Priority,
    pub occurred_at: DateTime<Utc>,
}

/// Completion notifications as they arrive from a host
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Native shape: priority as `low` / `medium` / `high`
    Quest {
        task_id: String,
        user_id: String,
        #[serde(default)]
        task_title: Option<String>,
        priority: String,
        /// Defaults to the time the event is received
        #[serde(default)]
        occurred_at: Option<DateTime<Utc>>,
    },
    /// CalDAV VTODO shape: iCalendar priority (0-9) and unix-seconds timestamp
    Caldav {
        uid: String,
        principal: String,
        #[serde(default)]
        summary: Option<String>,
        #[serde(default)]
        priority: Option<i64>,
        #[serde(default)]
        completed: Option<i64>,
    },
}

impl InboundEvent {
    /// Validate and convert into a [`CompletionEvent`]
    pub fn normalize(self, received_at: DateTime<Utc>) -> Result<CompletionEvent, QuestError> {
        match self {
            InboundEvent::Quest {
                task_id,
                user_id,
                task_title,
                priority,
                occurred_at,
            } => Ok(CompletionEvent {
                task_id: required(task_id, "task_id")?,
                user_id: required(user_id, "user_id")?,
                task_title: title_or_default(task_title),
                priority: priority.parse()?,
                occurred_at: occurred_at.unwrap_or(received_at),
            }),
            InboundEvent::Caldav {
                uid,
                principal,
                summary,
                priority,
                completed,
            } => {
                let principal = principal.trim().trim_end_matches('/');
                let user_id = principal
                    .strip_prefix(PRINCIPAL_PREFIX)
                    .unwrap_or(principal)
                    .to_string();
                let occurred_at = match completed {
                    Some(secs) => DateTime::from_timestamp(secs, 0)
                        .ok_or_else(|| QuestError::InvalidTimestamp(secs.to_string()))?,
                    None => received_at,
                };
                Ok(CompletionEvent {
                    task_id: required(uid, "uid")?,
                    user_id: required(user_id, "principal")?,
                    task_title: title_or_default(summary),
                    priority: Priority::from_ical(priority.unwrap_or(0))?,
                    occurred_at,
                })
            }
        }
    }
}

fn required(value: String, field: &'static str) -> Result<String, QuestError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(QuestError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn title_or_default(title: Option<String>) -> String {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED_TASK.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_normalize_quest_shape() {
        let json = r#"{"source":"quest","task_id":"t-1","user_id":"alice","task_title":"Write report","priority":"high"}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        let normalized = event.normalize(received()).unwrap();

        assert_eq!(normalized.task_id, "t-1");
        assert_eq!(normalized.user_id, "alice");
        assert_eq!(normalized.task_title, "Write report");
        assert_eq!(normalized.priority, Priority::High);
        assert_eq!(normalized.occurred_at, received());
    }

    #[test]
    fn test_normalize_caldav_shape() {
        let json = r#"{"source":"caldav","uid":"abc@host","principal":"principals/users/bob","priority":5,"completed":1700003600}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        let normalized = event.normalize(received()).unwrap();

        assert_eq!(normalized.user_id, "bob");
        assert_eq!(normalized.priority, Priority::Medium);
        assert_eq!(normalized.task_title, "Untitled task");
        assert_eq!(normalized.occurred_at.timestamp(), 1_700_003_600);
    }

    #[test]
    fn test_invalid_priority_fails_fast() {
        let json = r#"{"source":"quest","task_id":"t-1","user_id":"alice","priority":"urgent"}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event.normalize(received()),
            Err(QuestError::InvalidPriority(_))
        ));
    }

    #[test]
    fn test_missing_user_rejected() {
        let json = r#"{"source":"quest","task_id":"t-1","user_id":"  ","priority":"low"}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event.normalize(received()),
            Err(QuestError::MissingField("user_id"))
        ));
    }

    #[test]
    fn test_unknown_source_does_not_parse() {
        let json = r#"{"source":"jira","id":"X-1"}"#;
        assert!(serde_json::from_str::<InboundEvent>(json).is_err());
    }
}
