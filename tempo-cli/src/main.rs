//! Tempo — personal task/calendar planner.
//!
//! The engine runs as discrete batch passes; schedule `tempo daily-pass`
//! from cron or a systemd timer roughly once per day:
//!
//! ```bash
//! # Generate recurring tasks and fill today's free time
//! tempo daily-pass
//!
//! # Add backlog work and fixed appointments
//! tempo add "write report" --priority 3 --duration 90 --deadline 2026-03-01
//! tempo add "dentist" --zone --date 2026-02-20 --at 09:00 --until 10:00
//!
//! # Recurring template: weekday standup
//! tempo add "standup" --rule "FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"
//!
//! # Mark done (propagates through subtask hierarchies)
//! tempo toggle <id>
//! ```

use clap::Parser;

use tempo_cli::commands::{self, AddArgs, ListArgs, ToggleArgs};
use tempo_cli::config::{Config, ConfigArgs};

#[derive(Parser, Debug)]
#[command(version, about = "Personal task/calendar planner")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Add a task, template, subtask, or fixed zone.
    Add(AddArgs),
    /// List the backlog or one day's schedule.
    List(ListArgs),
    /// Toggle a task's completion state.
    Toggle(ToggleArgs),
    /// Run the daily pass: expand recurring tasks, fill today's gaps.
    DailyPass,
    /// Run the same pass on demand.
    Sync,
}

fn main() {
    let cli = Cli::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let result = match &cli.command {
        Command::Add(args) => commands::add(&config, args),
        Command::List(args) => commands::list(&config, args),
        Command::Toggle(args) => commands::toggle(&config, args),
        Command::DailyPass => commands::daily_pass(&config),
        Command::Sync => commands::sync(&config),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
