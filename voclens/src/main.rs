//! voclens - customer-support VOC analytics CLI
//!
//! Syncs conversations and tags from the messaging platform, serves
//! time-bucketed statistics, and drives report schedules (the manual
//! stand-in for a cron driver).
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/voclens/data.db
//! - Logs: $XDG_STATE_HOME/voclens/voclens.log
//! - Config: $XDG_CONFIG_HOME/voclens/config.toml

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use voclens_core::platform::{DocumentPublisher, NarrativeApiClient, OpenApiClient};
use voclens_core::schedule::{create_schedule, ScheduleExecutor};
use voclens_core::sync::SyncCoordinator;
use voclens_core::tags::expand_tag_ids;
use voclens_core::{stats, Config, Database};

#[derive(Parser)]
#[command(name = "voclens")]
#[command(about = "Customer-support VOC analytics and report scheduling")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync tags, teams, and recent conversations from the platform
    Sync {
        /// Conversation lookback in days
        #[arg(long, default_value = "7")]
        days: i64,
    },

    /// Print a daily per-tag series as JSON (chart feed)
    Stats {
        /// Tag ids to aggregate
        #[arg(long, required = true, value_delimiter = ',')]
        tags: Vec<String>,

        /// Range start (yyyy-mm-dd, inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// Range end (yyyy-mm-dd, inclusive)
        #[arg(long)]
        to: NaiveDate,

        /// Expand each tag id with its descendant tags
        #[arg(long)]
        recursive: bool,
    },

    /// Count conversations in a range, optionally filtered by tag ids
    Count {
        /// Range start (yyyy-mm-dd, inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// Range end (yyyy-mm-dd, inclusive)
        #[arg(long)]
        to: NaiveDate,

        /// Tag ids to filter by (matches any)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Manage report schedules
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
}

#[derive(Subcommand)]
enum ScheduleCommand {
    /// Create a schedule
    Create {
        /// Team that receives the report
        #[arg(long)]
        team: String,

        /// Tag ids the report aggregates over
        #[arg(long, required = true, value_delimiter = ',')]
        tags: Vec<String>,

        /// First execution date (yyyy-mm-dd)
        #[arg(long)]
        start: NaiveDate,

        /// Period length in days
        #[arg(long, default_value = "7")]
        period_days: i64,
    },

    /// List all schedules with their state
    List,

    /// Delete a schedule
    Delete { id: String },

    /// Execute one schedule now (manual trigger)
    Run { id: String },

    /// Execute every due schedule
    RunDue,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        voclens_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("voclens starting");

    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");

    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    match args.command {
        Command::Sync { days } => sync(&config, db, days).await,
        Command::Stats {
            tags,
            from,
            to,
            recursive,
        } => print_stats(&db, tags, from, to, recursive),
        Command::Count { from, to, tags } => print_count(&db, from, to, tags),
        Command::Schedule { command } => match command {
            ScheduleCommand::Create {
                team,
                tags,
                start,
                period_days,
            } => schedule_create(&db, team, tags, start, period_days),
            ScheduleCommand::List => schedule_list(&db),
            ScheduleCommand::Delete { id } => {
                db.delete_schedule(&id).context("failed to delete schedule")?;
                println!("Deleted schedule {}", id);
                Ok(())
            }
            ScheduleCommand::Run { id } => run_schedules(&config, &db, vec![id]).await,
            ScheduleCommand::RunDue => {
                let due: Vec<String> = db
                    .due_schedules(Utc::now())
                    .context("failed to query due schedules")?
                    .into_iter()
                    .map(|s| s.id)
                    .collect();
                if due.is_empty() {
                    println!("No schedules due.");
                    return Ok(());
                }
                run_schedules(&config, &db, due).await
            }
        },
    }
}

async fn sync(config: &Config, db: Database, days: i64) -> Result<()> {
    let client =
        OpenApiClient::new(&config.platform).context("platform API is not configured")?;
    let coordinator = SyncCoordinator::new(db, client);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Syncing from platform...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let tags = coordinator.sync_tags().await.context("tag sync failed")?;
    let teams = coordinator.sync_teams().await.context("team sync failed")?;
    let until = Utc::now();
    let conversations = coordinator
        .sync_conversations(Some(until - Duration::days(days)), Some(until))
        .await
        .context("conversation sync failed")?;

    spinner.finish_and_clear();
    println!(
        "Synced {} tags, {} teams, {} conversations (last {} days)",
        tags, teams, conversations, days
    );
    Ok(())
}

fn print_stats(
    db: &Database,
    tags: Vec<String>,
    from: NaiveDate,
    to: NaiveDate,
    recursive: bool,
) -> Result<()> {
    let tag_ids = if recursive {
        expand_tag_ids(db, &tags).context("failed to expand tag hierarchy")?
    } else {
        tags
    };

    let series = stats::daily_series_for(db, &tag_ids, from, to)
        .context("failed to compute daily series")?;
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

fn print_count(db: &Database, from: NaiveDate, to: NaiveDate, tags: Vec<String>) -> Result<()> {
    let start = from.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let end = (to + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap().and_utc();

    let records = db
        .conversations_in_range(start, end)
        .context("failed to load conversations")?;

    // Filters arrive as tag ids; counting matches by resolved name
    let names: Vec<String> = stats::tag_name_index(db, &tags)
        .context("failed to resolve tag names")?
        .into_values()
        .collect();

    let count = stats::count_in_range(&records, start, end, &names);
    println!("{}", count);
    Ok(())
}

fn schedule_create(
    db: &Database,
    team: String,
    tags: Vec<String>,
    start: NaiveDate,
    period_days: i64,
) -> Result<()> {
    let start_date = start.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let schedule = create_schedule(db, team, tags, start_date, period_days)
        .context("failed to create schedule")?;

    println!(
        "Created schedule {} (next execution {})",
        schedule.id, schedule.next_execution_at
    );
    Ok(())
}

fn schedule_list(db: &Database) -> Result<()> {
    let schedules = db.list_schedules().context("failed to list schedules")?;
    if schedules.is_empty() {
        println!("No schedules.");
        return Ok(());
    }

    let now = Utc::now();
    for s in schedules {
        println!(
            "{}  team={}  every {}d  next={}  last={}  [{}]",
            s.id,
            s.team_id,
            s.period_days,
            s.next_execution_at.format("%Y-%m-%d %H:%M"),
            s.last_executed_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
            s.state(now).as_str(),
        );
    }
    Ok(())
}

async fn run_schedules(config: &Config, db: &Database, ids: Vec<String>) -> Result<()> {
    let narrative =
        NarrativeApiClient::new(&config.narrative).context("narrative API is not configured")?;
    let documents =
        DocumentPublisher::new(&config.platform).context("document API is not configured")?;
    let executor =
        ScheduleExecutor::new(db, &narrative, &documents).with_weeks(config.report.weeks);

    for id in ids {
        let now = Utc::now();
        match executor.execute(&id, now).await {
            Ok(url) => println!("Executed schedule {}: {}", id, url),
            Err(e) => {
                tracing::error!(schedule_id = %id, error = %e, "Schedule execution failed");
                eprintln!("Schedule {} failed: {}", id, e);
            }
        }
    }
    Ok(())
}
