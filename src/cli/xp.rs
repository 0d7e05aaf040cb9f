//! XP calculator command
//!
//! Evaluates the configured rules without touching the database.

use anyhow::Result;
use serde_json::json;

use quest::Priority;
use quest::engine::ProgressRules;
use quest::error::{validate_level, validate_streak, validate_xp};

use super::print_json;

pub fn xp_command(
    rules: &ProgressRules,
    priority: &str,
    streak: i64,
    lifetime_xp: Option<i64>,
    level: Option<i64>,
    json: bool,
) -> Result<()> {
    let priority: Priority = priority.parse()?;
    let streak = validate_streak(streak)?;
    let lifetime_xp = lifetime_xp.map(validate_xp).transpose()?;
    let level = level.map(validate_level).transpose()?;

    let xp = rules.xp.calculate_xp(priority, streak);
    let multiplier = f64::from(rules.xp.streak_multiplier_percent(streak)) / 100.0;
    let info = lifetime_xp.map(|xp| rules.levels.info(xp));
    let thresholds = level.map(|l| {
        (
            l,
            rules.levels.xp_for_level(l),
            rules.levels.xp_for_next_level(l),
            rules.levels.rank_title(l).to_string(),
        )
    });

    if json {
        return print_json(&json!({
            "priority": priority,
            "streak": streak,
            "multiplier": multiplier,
            "xp": xp,
            "level_info": info,
            "level": thresholds.as_ref().map(|(l, at, next, title)| json!({
                "level": l,
                "xp_for_level": at,
                "xp_for_next_level": next,
                "rank_title": title,
            })),
        }));
    }

    println!(
        "{} priority at streak {}: {} XP ({:.1}x)",
        priority, streak, xp, multiplier
    );

    if let Some(info) = info {
        println!(
            "{} lifetime XP: level {} ({}), {:.1}% to next",
            info.lifetime_xp, info.level, info.rank_title, info.progress_percent
        );
    }

    if let Some((l, at, next, title)) = thresholds {
        match next {
            Some(next) => println!(
                "Level {} ({}) starts at {} XP, level {} at {} XP",
                l,
                title,
                at,
                l.saturating_add(1),
                next
            ),
            None => println!("Level {} ({}) starts at {} XP (max level)", l, title, at),
        }
    }
    Ok(())
}
