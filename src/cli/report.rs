//! Read-only report commands: stats, achievements, history, leaderboard

use anyhow::Result;
use chrono::Utc;

use quest::engine::StreakState;

use super::{App, print_json};

/// Show level, XP and streak for a user
pub fn stats_command(app: &App, user: &str, json: bool) -> Result<()> {
    let stats = app
        .query()
        .user_stats(&app.rules, &app.catalog, user, Utc::now())?;

    if json {
        return print_json(&stats);
    }

    println!("{} - {}", stats.user_id, stats.level.rank_title);
    println!(
        "  Level {} ({:.0}% to next)",
        stats.level.level, stats.level.progress_percent
    );
    match stats.level.next_level_xp {
        Some(next) => println!("  XP: {} / {}", stats.level.lifetime_xp, next),
        None => println!("  XP: {} (max level)", stats.level.lifetime_xp),
    }

    match stats.streak {
        StreakState::NoStreak => println!("  Streak: none"),
        StreakState::Active { count, deadline } => println!(
            "  Streak: {} day(s), complete a task before {}",
            count,
            deadline.format("%Y-%m-%d %H:%M UTC")
        ),
        StreakState::Expired { count, .. } => {
            println!("  Streak: lapsed (was {} day(s))", count)
        }
    }
    println!("  Longest streak: {}", stats.longest_streak);
    println!(
        "  Tasks: {} ({} high priority)",
        stats.tasks_completed, stats.high_priority_completed
    );
    println!(
        "  Achievements: {}/{}",
        stats.achievements_unlocked, stats.achievements_total
    );
    Ok(())
}

/// List the achievement catalog with the user's unlocks
pub fn achievements_command(app: &App, user: &str, json: bool) -> Result<()> {
    let achievements = app.query().achievements(&app.catalog, user)?;

    if json {
        return print_json(&achievements);
    }

    let unlocked = achievements.iter().filter(|a| a.unlocked_at.is_some()).count();
    println!("Achievements ({}/{}):\n", unlocked, achievements.len());

    for a in &achievements {
        let mark = match a.unlocked_at {
            Some(at) => format!("[x] {}", at.format("%Y-%m-%d")),
            None => "[ ]".to_string(),
        };
        println!(
            "  {} {} {} ({}) - {}",
            mark,
            a.icon,
            a.name,
            a.rarity.as_str(),
            a.description
        );
    }
    Ok(())
}

/// Show a user's most recent completions
pub fn history_command(app: &App, user: &str, limit: usize, json: bool) -> Result<()> {
    let history = app.query().history(user, limit)?;

    if json {
        return print_json(&history);
    }

    if history.is_empty() {
        println!("No completions recorded for {}.", user);
        return Ok(());
    }

    for entry in &history {
        println!(
            "  {} [{}] {} +{} XP (streak {}, level {})",
            entry.completed_at.format("%Y-%m-%d %H:%M"),
            entry.priority,
            entry.task_title,
            entry.xp_awarded,
            entry.streak_after,
            entry.level_after
        );
    }
    Ok(())
}

/// Top users by lifetime XP
pub fn leaderboard_command(app: &App, limit: usize, json: bool) -> Result<()> {
    let entries = app.query().leaderboard(&app.rules.streak, limit, Utc::now())?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("Leaderboard is empty.");
        return Ok(());
    }

    for e in &entries {
        println!(
            "  {:>3}. {:<24} Lv {:>3} {:<24} {:>8} XP  streak {}",
            e.position, e.user_id, e.level, e.rank_title, e.lifetime_xp, e.current_streak
        );
    }
    Ok(())
}
