use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::App;

#[derive(Parser)]
#[command(name = "quest")]
#[command(about = "Quest - XP, levels, streaks and achievements for completed tasks")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.quest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database (overrides [database] path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and background jobs
    Serve {
        /// Bind address (overrides [server] bind)
        #[arg(long)]
        bind: Option<String>,

        /// Port (overrides [server] port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Record a completed task
    Complete {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        task: String,

        /// Task title shown in history
        #[arg(long)]
        title: Option<String>,

        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Completion time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show level, XP and streak for a user
    Stats {
        #[arg(short, long)]
        user: String,

        #[arg(long)]
        json: bool,
    },

    /// List achievements and which ones a user has unlocked
    Achievements {
        #[arg(short, long)]
        user: String,

        #[arg(long)]
        json: bool,
    },

    /// Show a user's recent completions
    History {
        #[arg(short, long)]
        user: String,

        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Top users by lifetime XP
    Leaderboard {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Calculate XP and levels without recording anything
    Xp {
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Current streak length
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        streak: i64,

        /// Show the level standing for this lifetime XP
        #[arg(long, allow_negative_numbers = true)]
        lifetime_xp: Option<i64>,

        /// Show the XP thresholds of this level
        #[arg(long, allow_negative_numbers = true)]
        level: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Run the background jobs once
    RunJobs {
        #[arg(long)]
        json: bool,
    },

    /// Write a documented default ~/.quest/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(cli.config.clone(), force)?;
        }
        Commands::Xp {
            priority,
            streak,
            lifetime_xp,
            level,
            json,
        } => {
            let config = quest::config::Config::load(config_path)?;
            cli::xp::xp_command(&config.rules(), &priority, streak, lifetime_xp, level, json)?;
        }
        Commands::Serve { bind, port } => {
            let app = App::open(config_path, cli.db)?;
            cli::serve::serve_command(app, bind, port).await?;
        }
        Commands::Complete {
            user,
            task,
            title,
            priority,
            at,
            json,
        } => {
            let app = App::open(config_path, cli.db)?;
            cli::complete::complete_command(&app, user, task, title, priority, at, json)?;
        }
        Commands::Stats { user, json } => {
            let app = App::open(config_path, cli.db)?;
            cli::report::stats_command(&app, &user, json)?;
        }
        Commands::Achievements { user, json } => {
            let app = App::open(config_path, cli.db)?;
            cli::report::achievements_command(&app, &user, json)?;
        }
        Commands::History { user, limit, json } => {
            let app = App::open(config_path, cli.db)?;
            cli::report::history_command(&app, &user, limit, json)?;
        }
        Commands::Leaderboard { limit, json } => {
            let app = App::open(config_path, cli.db)?;
            cli::report::leaderboard_command(&app, limit, json)?;
        }
        Commands::RunJobs { json } => {
            let app = App::open(config_path, cli.db)?;
            cli::jobs::run_jobs_command(&app, json)?;
        }
    }

    Ok(())
}
