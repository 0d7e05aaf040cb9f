//! Core domain types for Quest

mod event;
mod notification;
mod priority;
mod progress;

pub use event::{CompletionEvent, InboundEvent};
pub use notification::{Notification, NotificationKind};
pub use priority::Priority;
pub use progress::{AchievementUnlock, HistoryEntry, UserProgress, UserSettings};
