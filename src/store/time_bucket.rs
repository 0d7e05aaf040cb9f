//! Timestamp and day-bucket helpers for the quest database
//!
//! Timestamps are stored as Unix milliseconds. Day buckets are "YYYY-MM-DD"
//! strings in the streak policy's local offset, so "tasks today" agrees with
//! the streak tracker's notion of a day.

use chrono::{DateTime, NaiveDate, Utc};

use crate::engine::StreakPolicy;

pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Inverse of [`to_millis`]; out-of-range values clamp to the epoch
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Local day bucket for `at`
pub fn day_bucket(policy: &StreakPolicy, at: DateTime<Utc>) -> String {
    format_day(policy.local_date(at))
}

fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_bucket_uses_local_offset() {
        let at = Utc.with_ymd_and_hms(2023, 12, 28, 23, 30, 0).unwrap();
        assert_eq!(day_bucket(&StreakPolicy::default(), at), "2023-12-28");

        let berlin = StreakPolicy {
            utc_offset_minutes: 60,
            ..StreakPolicy::default()
        };
        assert_eq!(day_bucket(&berlin, at), "2023-12-29");
    }

    #[test]
    fn test_millis_round_trip() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(from_millis(to_millis(at)), at);
    }
}
