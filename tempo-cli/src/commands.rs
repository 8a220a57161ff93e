//! Subcommand implementations.

use chrono::{Local, NaiveDate, NaiveTime};
use tempo_core::rule::RecurrenceRule;
use tempo_core::task::{Task, TaskId};
use tempo_engine::score::yield_score;
use tempo_engine::{Engine, EngineError, StoreError, TaskStore};

use crate::config::Config;
use crate::store_json::JsonFileStore;

/// Errors a command can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The engine refused or the store failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A direct store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// User input could not be parsed.
    #[error("invalid {what}: {value}")]
    InvalidInput {
        /// Which argument was invalid.
        what: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Arguments for `tempo add`.
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Task title.
    pub title: String,

    /// Priority, 1 (lowest) to 4 (highest).
    #[arg(short, long, default_value_t = 1)]
    pub priority: u8,

    /// Duration in minutes.
    #[arg(short, long, default_value_t = 30)]
    pub duration: i64,

    /// Deadline date, `YYYY-MM-DD`.
    #[arg(long)]
    pub deadline: Option<String>,

    /// Free-form description.
    #[arg(long)]
    pub description: Option<String>,

    /// Category name.
    #[arg(long)]
    pub category: Option<String>,

    /// Recurrence rule, e.g. `FREQ=WEEKLY;BYDAY=MO,WE`. Makes this task
    /// a template that spawns dated instances on each daily pass.
    #[arg(long)]
    pub rule: Option<String>,

    /// Parent task id, making this a subtask.
    #[arg(long)]
    pub parent: Option<String>,

    /// Mark as a fixed zone (appointment). Requires --date, --at and --until.
    #[arg(long, requires_all = ["date", "at", "until"])]
    pub zone: bool,

    /// Date the zone occupies, `YYYY-MM-DD`.
    #[arg(long)]
    pub date: Option<String>,

    /// Zone start time, `HH:MM`.
    #[arg(long)]
    pub at: Option<String>,

    /// Zone end time, `HH:MM`.
    #[arg(long)]
    pub until: Option<String>,
}

/// Creates a task, template, subtask, or zone.
///
/// # Errors
///
/// Fails on unparsable input or a store write failure.
pub fn add(config: &Config, args: &AddArgs) -> Result<(), CommandError> {
    if !(1..=4).contains(&args.priority) {
        return Err(CommandError::InvalidInput {
            what: "priority",
            value: args.priority.to_string(),
        });
    }
    if args.duration <= 0 {
        return Err(CommandError::InvalidInput {
            what: "duration",
            value: args.duration.to_string(),
        });
    }

    let mut task = Task::new(args.title.clone());
    task.priority = args.priority;
    task.duration_minutes = args.duration;
    task.estimated_blocks =
        tempo_core::blocks::minutes_to_blocks(u32::try_from(args.duration).unwrap_or(0));
    task.description = args.description.clone().unwrap_or_default();
    if let Some(category) = &args.category {
        task.category_id.clone_from(category);
    }
    task.deadline = args
        .deadline
        .as_deref()
        .map(|d| parse_date("deadline", d))
        .transpose()?;
    task.hierarchy_parent_id = args
        .parent
        .as_deref()
        .map(|p| parse_id("parent", p))
        .transpose()?;

    if let Some(rule) = &args.rule {
        // Validate up front so a typo fails the command instead of being
        // skipped silently on every future pass.
        rule.parse::<RecurrenceRule>()
            .map_err(|e| CommandError::InvalidInput {
                what: "rule",
                value: format!("{rule} ({e})"),
            })?;
        task.recurrence_rule = Some(rule.clone());
    }

    if args.zone {
        let (Some(date), Some(at), Some(until)) = (&args.date, &args.at, &args.until) else {
            // clap's requires_all guards the binary path; direct callers land here.
            return Err(CommandError::InvalidInput {
                what: "zone",
                value: "--zone needs --date, --at and --until".to_string(),
            });
        };
        let date = parse_date("date", date)?;
        let start = parse_time("at", at)?;
        let end = parse_time("until", until)?;
        if end <= start {
            return Err(CommandError::InvalidInput {
                what: "until",
                value: until.clone(),
            });
        }
        task.is_zone = true;
        task.scheduled_date = Some(date);
        task.start = Some(date.and_time(start));
        task.end = Some(date.and_time(end));
        task.duration_minutes = (date.and_time(end) - date.and_time(start)).num_minutes();
    }

    let store = JsonFileStore::new(&config.data_file);
    let id = task.id.clone();
    store.upsert(task)?;
    println!("added {id}");
    Ok(())
}

/// Arguments for `tempo list`.
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show the schedule for this date (`YYYY-MM-DD`) instead of the backlog.
    #[arg(long)]
    pub date: Option<String>,
}

/// Lists the backlog (score-ranked) or one day's schedule.
///
/// # Errors
///
/// Fails on unparsable input or a store read failure.
pub fn list(config: &Config, args: &ListArgs) -> Result<(), CommandError> {
    let store = JsonFileStore::new(&config.data_file);
    let today = Local::now().date_naive();

    if let Some(date) = &args.date {
        let date = parse_date("date", date)?;
        let fixed = store.get_fixed_for_date(date)?;
        if fixed.is_empty() {
            println!("nothing scheduled on {date}");
            return Ok(());
        }
        for task in fixed {
            let (Some(start), Some(end)) = (task.start, task.end) else {
                continue;
            };
            let marker = if task.is_zone { "zone" } else { "task" };
            let done = if task.is_completed { " [done]" } else { "" };
            println!(
                "{}-{}  {marker}  {}  {}{done}",
                start.format("%H:%M"),
                end.format("%H:%M"),
                task.id,
                task.title
            );
        }
        return Ok(());
    }

    let mut backlog = store.get_backlog()?;
    if backlog.is_empty() {
        println!("backlog is empty");
        return Ok(());
    }
    backlog.sort_by_key(|t| std::cmp::Reverse(yield_score(t, today)));
    for task in backlog {
        println!(
            "{:>4}  {}  {} ({}m)",
            yield_score(&task, today),
            task.id,
            task.title,
            task.duration_minutes
        );
    }
    Ok(())
}

/// Arguments for `tempo toggle`.
#[derive(clap::Args, Debug)]
pub struct ToggleArgs {
    /// Id of the task to toggle.
    pub id: String,

    /// Mark as not done instead of done.
    #[arg(long)]
    pub undone: bool,
}

/// Toggles a task's completion, propagating through its hierarchy.
///
/// # Errors
///
/// Fails if the id is unknown, the hierarchy is cyclic, or the store fails.
pub fn toggle(config: &Config, args: &ToggleArgs) -> Result<(), CommandError> {
    let id = parse_id("id", &args.id)?;
    let store = JsonFileStore::new(&config.data_file);
    let today = Local::now().date_naive();

    let written =
        tempo_engine::completion::toggle_completion(&store, &id, !args.undone, today)?;
    let state = if args.undone { "open" } else { "done" };
    println!("marked {id} {state} ({written} task(s) updated)");
    Ok(())
}

/// Runs the daily scheduling pass (recurrence expansion + auto-schedule).
///
/// # Errors
///
/// Fails if the store is unavailable; safe to retry wholesale.
pub fn daily_pass(config: &Config) -> Result<(), CommandError> {
    let store = JsonFileStore::new(&config.data_file);
    let engine = Engine::with_config(store, config.engine);
    let today = Local::now().date_naive();

    let report = engine.run_daily_pass(today)?;
    println!(
        "pass complete: {} instance(s) generated, {} task(s) placed",
        report.instances_spawned, report.tasks_placed
    );
    Ok(())
}

/// Runs an on-demand pass (same body as the daily pass; duplicate
/// invocations are harmless).
///
/// # Errors
///
/// Same as [`daily_pass`].
pub fn sync(config: &Config) -> Result<(), CommandError> {
    let store = JsonFileStore::new(&config.data_file);
    let engine = Engine::with_config(store, config.engine);
    let today = Local::now().date_naive();

    let report = engine.run_on_demand(today)?;
    println!(
        "sync complete: {} instance(s) generated, {} task(s) placed",
        report.instances_spawned, report.tasks_placed
    );
    Ok(())
}

fn parse_date(what: &'static str, text: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| CommandError::InvalidInput {
        what,
        value: text.to_string(),
    })
}

fn parse_time(what: &'static str, text: &str) -> Result<NaiveTime, CommandError> {
    NaiveTime::parse_from_str(text, "%H:%M").map_err(|_| CommandError::InvalidInput {
        what,
        value: text.to_string(),
    })
}

fn parse_id(what: &'static str, text: &str) -> Result<TaskId, CommandError> {
    text.parse().map_err(|_| CommandError::InvalidInput {
        what,
        value: text.to_string(),
    })
}
