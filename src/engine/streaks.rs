//! Streak tracking
//!
//! A streak counts consecutive periods (calendar days by default) with at
//! least one completion. It survives as long as the next completion lands
//! within the grace window after the previous one.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

/// How two completions are judged to fall in the same period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayBoundary {
    /// Same local calendar date
    CalendarDay,
    /// Less than 24 hours apart
    Rolling24h,
}

/// Streak rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPolicy {
    #[serde(default = "default_grace_hours")]
    pub grace_hours: u32,

    #[serde(default = "default_day_boundary")]
    pub day_boundary: DayBoundary,

    /// Offset used to derive local calendar dates
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_grace_hours() -> u32 {
    48
}

fn default_day_boundary() -> DayBoundary {
    DayBoundary::CalendarDay
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            grace_hours: default_grace_hours(),
            day_boundary: default_day_boundary(),
            utc_offset_minutes: 0,
        }
    }
}

/// What a completion did to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First completion ever
    Started,
    /// Grace window had passed, streak back to 1
    Reset,
    /// Same period as the previous completion, count unchanged
    Unchanged,
    /// Next period within the grace window, count + 1
    Extended,
}

/// Result of applying a completion to a streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakUpdate {
    pub current: u32,
    pub longest: u32,
    pub transition: StreakTransition,
}

/// Streak state at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StreakState {
    NoStreak,
    Active {
        count: u32,
        deadline: DateTime<Utc>,
    },
    /// Grace window passed; the next completion starts over at 1
    Expired {
        count: u32,
        expired_at: DateTime<Utc>,
    },
}

impl StreakPolicy {
    pub fn grace(&self) -> Duration {
        Duration::hours(i64::from(self.grace_hours))
    }

    /// Latest time the next completion keeps the streak alive
    pub fn grace_deadline(&self, last_completion_at: DateTime<Utc>) -> DateTime<Utc> {
        last_completion_at + self.grace()
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Wall-clock time in the configured offset
    pub fn local_datetime(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.offset()).naive_local()
    }

    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(at).date()
    }

    pub fn is_weekend(&self, at: DateTime<Utc>) -> bool {
        matches!(self.local_date(at).weekday(), Weekday::Sat | Weekday::Sun)
    }

    fn same_period(&self, last: DateTime<Utc>, at: DateTime<Utc>) -> bool {
        match self.day_boundary {
            DayBoundary::CalendarDay => self.local_date(last) == self.local_date(at),
            DayBoundary::Rolling24h => at - last < Duration::hours(24),
        }
    }

    /// Apply a completion at `at` to the streak counters
    pub fn apply(
        &self,
        current: u32,
        longest: u32,
        last_completion_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> StreakUpdate {
        let (current, transition) = match last_completion_at {
            None => (1, StreakTransition::Started),
            Some(_) if current == 0 => (1, StreakTransition::Started),
            // Late-arriving events never move the streak
            Some(last) if at < last => (current, StreakTransition::Unchanged),
            Some(last) if at - last > self.grace() => (1, StreakTransition::Reset),
            Some(last) if self.same_period(last, at) => (current, StreakTransition::Unchanged),
            Some(_) => (current.saturating_add(1), StreakTransition::Extended),
        };

        StreakUpdate {
            current,
            longest: longest.max(current),
            transition,
        }
    }

    /// Evaluate the streak at `now` without a new completion
    pub fn state(
        &self,
        current: u32,
        last_completion_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> StreakState {
        let Some(last) = last_completion_at.filter(|_| current > 0) else {
            return StreakState::NoStreak;
        };

        let deadline = self.grace_deadline(last);
        if now <= deadline {
            StreakState::Active {
                count: current,
                deadline,
            }
        } else {
            StreakState::Expired {
                count: current,
                expired_at: deadline,
            }
        }
    }

    /// Streak count as it should be displayed at `now` (0 once expired)
    pub fn effective_streak(
        &self,
        current: u32,
        last_completion_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> u32 {
        match self.state(current, last_completion_at, now) {
            StreakState::Active { count, .. } => count,
            StreakState::NoStreak | StreakState::Expired { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_first_completion_starts_streak() {
        let policy = StreakPolicy::default();
        let update = policy.apply(0, 0, None, at(1, 9));
        assert_eq!(update.current, 1);
        assert_eq!(update.longest, 1);
        assert_eq!(update.transition, StreakTransition::Started);
    }

    #[test]
    fn test_same_day_does_not_increment() {
        let policy = StreakPolicy::default();
        let update = policy.apply(3, 5, Some(at(1, 8)), at(1, 22));
        assert_eq!(update.current, 3);
        assert_eq!(update.longest, 5);
        assert_eq!(update.transition, StreakTransition::Unchanged);
    }

    #[test]
    fn test_next_day_extends() {
        let policy = StreakPolicy::default();
        let update = policy.apply(3, 3, Some(at(1, 23)), at(2, 1));
        assert_eq!(update.current, 4);
        assert_eq!(update.longest, 4);
        assert_eq!(update.transition, StreakTransition::Extended);
    }

    #[test]
    fn test_gap_beyond_grace_resets() {
        let policy = StreakPolicy::default();
        let update = policy.apply(9, 9, Some(at(1, 8)), at(3, 9));
        assert_eq!(update.current, 1);
        assert_eq!(update.longest, 9);
        assert_eq!(update.transition, StreakTransition::Reset);
    }

    #[test]
    fn test_exactly_at_grace_deadline_extends() {
        let policy = StreakPolicy::default();
        let update = policy.apply(2, 2, Some(at(1, 8)), at(3, 8));
        assert_eq!(update.transition, StreakTransition::Extended);
        assert_eq!(update.current, 3);
    }

    #[test]
    fn test_out_of_order_event_is_ignored() {
        let policy = StreakPolicy::default();
        let update = policy.apply(4, 4, Some(at(5, 8)), at(2, 8));
        assert_eq!(update.current, 4);
        assert_eq!(update.transition, StreakTransition::Unchanged);
    }

    #[test]
    fn test_rolling_boundary() {
        let policy = StreakPolicy {
            day_boundary: DayBoundary::Rolling24h,
            ..StreakPolicy::default()
        };
        // Crosses midnight but only 2 hours apart
        let update = policy.apply(1, 1, Some(at(1, 23)), at(2, 1));
        assert_eq!(update.transition, StreakTransition::Unchanged);

        let update = policy.apply(1, 1, Some(at(1, 8)), at(2, 9));
        assert_eq!(update.transition, StreakTransition::Extended);
    }

    #[test]
    fn test_utc_offset_moves_day_boundary() {
        let policy = StreakPolicy {
            utc_offset_minutes: 120,
            ..StreakPolicy::default()
        };
        // 21:00 and 23:00 UTC are 23:00 and 01:00 next day at +02:00
        let update = policy.apply(1, 1, Some(at(1, 21)), at(1, 23));
        assert_eq!(update.transition, StreakTransition::Extended);
    }

    #[test]
    fn test_longest_never_decreases() {
        let policy = StreakPolicy::default();
        let times = [at(1, 9), at(2, 9), at(2, 18), at(3, 9), at(10, 9), at(11, 9)];
        let mut current = 0;
        let mut longest = 0;
        let mut last = None;
        for t in times {
            let update = policy.apply(current, longest, last, t);
            assert!(update.longest >= longest);
            assert!(update.longest >= update.current);
            current = update.current;
            longest = update.longest;
            last = Some(t);
        }
        assert_eq!(longest, 3);
        assert_eq!(current, 2);
    }

    #[test]
    fn test_state_and_deadline() {
        let policy = StreakPolicy::default();
        assert_eq!(policy.state(0, None, at(1, 0)), StreakState::NoStreak);

        let last = at(1, 12);
        assert_eq!(policy.grace_deadline(last), at(3, 12));
        assert_eq!(
            policy.state(2, Some(last), at(2, 12)),
            StreakState::Active {
                count: 2,
                deadline: at(3, 12)
            }
        );
        assert_eq!(
            policy.state(2, Some(last), at(4, 12)),
            StreakState::Expired {
                count: 2,
                expired_at: at(3, 12)
            }
        );
        assert_eq!(policy.effective_streak(2, Some(last), at(4, 12)), 0);
    }
}
