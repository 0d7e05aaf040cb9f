//! Complete command implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use quest::InboundEvent;
use quest::completion::CompletionOutcome;
use quest::error::QuestError;

use super::{App, print_json};

/// Record a task completion for a user
pub fn complete_command(
    app: &App,
    user: String,
    task: String,
    title: Option<String>,
    priority: String,
    at: Option<String>,
    json: bool,
) -> Result<()> {
    let occurred_at = at
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| QuestError::InvalidTimestamp(raw))
        })
        .transpose()?;

    let event = InboundEvent::Quest {
        task_id: task,
        user_id: user,
        task_title: title,
        priority,
        occurred_at,
    };

    let outcome = app
        .orchestrator()
        .handle_inbound(event, Utc::now())
        .context("Completion was not recorded")?;

    if json {
        return print_json(&outcome);
    }
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &CompletionOutcome) {
    if outcome.duplicate {
        println!(
            "Already recorded: {} for {} (nothing awarded)",
            outcome.task_id, outcome.user_id
        );
        return;
    }

    println!(
        "+{} XP for {} ({} XP total)",
        outcome.xp_awarded, outcome.user_id, outcome.lifetime_xp
    );

    if outcome.leveled_up {
        println!(
            "Level up! {} -> {} ({})",
            outcome.previous_level, outcome.level, outcome.rank_title
        );
    } else {
        println!(
            "Level {} ({}), {:.0}% to next level",
            outcome.level, outcome.rank_title, outcome.progress_percent
        );
    }

    println!(
        "Streak: {} (longest {})",
        outcome.current_streak, outcome.longest_streak
    );
    if let Some(deadline) = outcome.streak_deadline {
        println!("  Keep it alive before {}", deadline.format("%Y-%m-%d %H:%M UTC"));
    }

    for achievement in &outcome.new_achievements {
        println!(
            "Achievement unlocked: {} [{}] - {}",
            achievement.name,
            achievement.rarity.as_str(),
            achievement.description
        );
    }
}
