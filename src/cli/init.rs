//! Init command implementation

use anyhow::{Result, bail};
use std::path::PathBuf;

use quest::config::{Config, generate_auth_token, write_config_file};

/// Default configuration content for quest init
///
/// `{auth_token}` is replaced with a freshly generated token.
pub const DEFAULT_CONFIG: &str = r#"# Quest Configuration
# ===================
#
# Quest turns completed tasks into XP, levels, streaks and achievements.
# Every value below is the built-in default; delete a line to keep it.

# ============================================================================
# SERVER - Local HTTP API (`quest serve`)
# ============================================================================
#
# Task hosts POST completions to /api/events/task-completed.
# Requests must send the token below as `X-Quest-Token`.
# Leave auth_token empty to disable auth (local development only).

[server]
bind = "127.0.0.1"
port = 9877
auth_token = "{auth_token}"

# ============================================================================
# DATABASE
# ============================================================================
#
# Defaults to ~/.quest/quest.db
# path = "/var/lib/quest/quest.db"

[database]

# ============================================================================
# XP - Points per completed task
# ============================================================================
#
# xp = floor((base_xp + priority bonus) * multiplier)
# multiplier = min(100 + streak_step_percent * streak, streak_cap_percent) / 100

[xp]
base_xp = 10
low_bonus = 0
medium_bonus = 5
high_bonus = 10
streak_step_percent = 10
streak_cap_percent = 200

# ============================================================================
# LEVELS - Cumulative XP per level
# ============================================================================
#
# Level 2 needs first_increment XP; every further step is growth_percent of
# the previous step (150 = 1.5x): 0, 100, 250, 475, 812, ...
# Rank titles apply from their level upwards ([[levels.ranks]] entries).

[levels]
first_increment = 100
growth_percent = 150
max_level = 100

# ============================================================================
# STREAK - Consecutive days with at least one completion
# ============================================================================
#
# day_boundary: "calendar_day" (local date, using utc_offset_minutes) or
#               "rolling_24h" (completions less than 24h apart share a period)
# grace_hours:  a completion more than this long after the previous one
#               starts the streak over at 1

[streak]
grace_hours = 48
day_boundary = "calendar_day"
utc_offset_minutes = 0

# ============================================================================
# NOTIFICATIONS
# ============================================================================
#
# Notifications are POSTed as JSON to webhook_url.
# Leave empty to only write them to the log.

[notifications]
webhook_url = ""
timeout_secs = 10

# ============================================================================
# JOBS - Background jobs run by `quest serve` (or once via `quest run-jobs`)
# ============================================================================
#
# reminder_window_hours: remind users whose streak lapses within this window
# summary_hour:          local hour after which the daily summary is sent

[jobs]
interval_secs = 900
reminder_window_hours = 12
summary_hour = 21
"#;

/// Write a documented default config with a fresh auth token
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    // Default to global config path
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let token = generate_auth_token();
    let content = DEFAULT_CONFIG.replace("{auth_token}", &token);
    write_config_file(&config_path, &content)?;

    println!("Created: {}", config_path.display());
    println!("API token: {}", token);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let content = DEFAULT_CONFIG.replace("{auth_token}", "abc");
        let config: Config = toml::from_str(&content).unwrap();
        let defaults = Config::default();

        assert_eq!(config.server.auth_token, "abc");
        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.xp, defaults.xp);
        assert_eq!(config.levels, defaults.levels);
        assert_eq!(config.streak, defaults.streak);
        assert_eq!(config.jobs.summary_hour, defaults.jobs.summary_hour);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init_command(Some(path.clone()), false).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(!first.contains("{auth_token}"));

        assert!(init_command(Some(path.clone()), false).is_err());
        init_command(Some(path.clone()), true).unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), first);
    }
}
