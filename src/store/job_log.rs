//! Background job bookkeeping
//!
//! One row per (job, user, local day) so a job that runs every few minutes
//! notifies each user at most once per day.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use super::time_bucket::to_millis;

/// Record that `job` ran for `user_id` on `day`.
///
/// Returns false if it had already run, in which case nothing should be sent.
pub fn claim(
    conn: &Connection,
    job: &str,
    user_id: &str,
    day: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO job_log (job, user_id, day_bucket, ran_at) VALUES (?1, ?2, ?3, ?4)",
        params![job, user_id, day, to_millis(now)],
    )?;
    Ok(inserted > 0)
}

/// Forget a claim, used when delivery failed and the job should try again
pub fn release(conn: &Connection, job: &str, user_id: &str, day: &str) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM job_log WHERE job = ?1 AND user_id = ?2 AND day_bucket = ?3",
        params![job, user_id, day],
    )?;
    Ok(())
}
