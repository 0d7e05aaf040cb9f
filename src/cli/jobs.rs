//! Run-jobs command implementation

use anyhow::Result;
use chrono::Utc;

use quest::jobs::JobRunner;

use super::{App, print_json};

/// Run the background jobs once (for cron-driven deployments)
pub fn run_jobs_command(app: &App, json: bool) -> Result<()> {
    let runner = JobRunner::new(
        app.db.clone(),
        app.rules.clone(),
        app.config.jobs.clone(),
        app.notifier.clone(),
    );
    let report = runner.run_all(Utc::now());

    if json {
        return print_json(&report);
    }
    println!(
        "Sent {} streak reminder(s) and {} daily summary(ies).",
        report.streak_reminders, report.daily_summaries
    );
    Ok(())
}
