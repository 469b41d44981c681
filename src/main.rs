// weekplan - personal planner over a sliding multi-week window
// Command-line front end for the synchronizer

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use weekplan::calendar::{date_utils, math, resolver, time_format};
use weekplan::config::{validate_config, AppConfig};
use weekplan::utils::logging::{init_logging, log_error_with_context};
use weekplan::{
    AppError, AppResult, Database, DateRange, EventKind, EventPatch, FirstDayOfWeek, NewEvent,
    Occurrence, Recurrence, Settings, SyncSettings, Synchronizer, TimeFormat,
};

#[derive(Debug, Parser)]
#[command(name = "weekplan", version, about = "Plan one-off and recurring events across a multi-week view")]
struct Cli {
    /// Database file (overrides WEEKPLAN_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the multi-week window around a date (default: today)
    Week {
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
    /// Show a single day
    Day {
        #[arg(value_parser = parse_date_arg)]
        date: NaiveDate,
    },
    /// Create an event or task
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// HH:MM; omit for all-day
        #[arg(long, value_parser = parse_time_arg)]
        time: Option<NaiveTime>,
        /// none, daily, weekly or monthly
        #[arg(long, default_value = "none")]
        recurrence: Recurrence,
        /// event or task
        #[arg(long = "type", default_value = "event")]
        kind: EventKind,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change fields of an existing entry
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_time_arg)]
        time: Option<NaiveTime>,
        /// Drop the time and make the entry all-day
        #[arg(long, conflicts_with = "time")]
        all_day: bool,
        #[arg(long)]
        recurrence: Option<Recurrence>,
        #[arg(long = "type")]
        kind: Option<EventKind>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
    },
    /// Delete an entry and all of its occurrences
    Remove { id: String },
    /// Show or change calendar preferences
    Settings {
        #[arg(long)]
        first_day: Option<FirstDayOfWeek>,
        #[arg(long)]
        time_format: Option<TimeFormat>,
        /// Weeks shown by `week`, 1 to 52
        #[arg(long)]
        weeks: Option<u32>,
        /// Months fetched on each side of the view, at most 60
        #[arg(long)]
        margin_months: Option<u32>,
    },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    date_utils::parse_date(s).map_err(|e| e.to_string())
}

fn parse_time_arg(s: &str) -> Result<NaiveTime, String> {
    date_utils::parse_time(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    validate_config(&config)?;

    let db = Arc::new(Database::new(&config.db_path).await?);
    let settings = db.get_settings().await?;
    let sync = Synchronizer::new(db.clone(), SyncSettings::from_settings(&settings, config.retry.clone()));
    info!("Using database at {}", config.db_path.display());

    let app = App { db, sync, settings, json: cli.json };
    if let Err(e) = app.run(cli.command).await {
        log_error_with_context(&e, "weekplan");
        eprintln!("{}", e.to_safe_string());
        std::process::exit(1);
    }
    Ok(())
}

struct App {
    db: Arc<Database>,
    sync: Synchronizer,
    settings: Settings,
    json: bool,
}

impl App {
    async fn run(&self, command: Command) -> AppResult<()> {
        match command {
            Command::Week { date } => self.week(date.unwrap_or_else(date_utils::today)).await,
            Command::Day { date } => self.day(date).await,
            Command::Add { title, date, time, recurrence, kind, description } => {
                let input = NewEvent {
                    title,
                    description,
                    date,
                    time,
                    recurrence,
                    kind,
                };
                self.display_window(date).await;
                let created = self.sync.create(input).await?;
                self.print_event(&created)
            }
            Command::Edit {
                id,
                title,
                date,
                time,
                all_day,
                recurrence,
                kind,
                description,
                clear_description,
            } => {
                let patch = EventPatch {
                    title,
                    description: if clear_description { Some(None) } else { description.map(Some) },
                    date,
                    time: if all_day { Some(None) } else { time.map(Some) },
                    recurrence,
                    kind,
                };
                if patch.is_empty() {
                    return Err(AppError::invalid_input("nothing to change"));
                }
                let updated = self.sync.update(&id, patch).await?;
                self.print_event(&updated)
            }
            Command::Remove { id } => {
                self.sync.remove(&id).await?;
                if self.json {
                    println!("{}", serde_json::json!({ "removed": id }));
                } else {
                    println!("Removed {}", id);
                }
                Ok(())
            }
            Command::Settings { first_day, time_format, weeks, margin_months } => {
                self.update_settings(first_day, time_format, weeks, margin_months).await
            }
        }
    }

    fn visible_range(&self, focus: NaiveDate) -> DateRange {
        math::visible_range(focus, self.settings.first_day_of_week, self.settings.visible_weeks)
    }

    async fn display_window(&self, focus: NaiveDate) -> Vec<Occurrence> {
        let outcome = self.sync.load(self.visible_range(focus)).await;
        match outcome.occurrences() {
            Some(occurrences) => occurrences.to_vec(),
            None => {
                warn!("Load did not complete ({:?}); showing held view", outcome);
                self.sync.occurrences().await
            }
        }
    }

    async fn week(&self, focus: NaiveDate) -> AppResult<()> {
        let occurrences = self.display_window(focus).await;
        if self.json {
            return print_json(&occurrences);
        }

        let range = self.visible_range(focus);
        let by_day = resolver::group_by_day(&occurrences, range);
        let weeks = math::visible_weeks(focus, self.settings.first_day_of_week, self.settings.visible_weeks);

        println!("{}", date_utils::format_month_year(focus));
        for week in weeks {
            println!();
            println!("Week of {}", date_utils::format_date(week[0]));
            for day in week {
                let marker = if date_utils::is_today(day) { '*' } else { ' ' };
                let entries = by_day.get(&day).map(Vec::as_slice).unwrap_or(&[]);
                println!("{} {}", marker, day.format("%a %Y-%m-%d"));
                for occurrence in entries {
                    println!("    {}", self.describe(occurrence));
                }
            }
        }
        Ok(())
    }

    async fn day(&self, date: NaiveDate) -> AppResult<()> {
        self.display_window(date).await;
        let occurrences = self.sync.resolve_for_day(date).await;
        if self.json {
            return print_json(&occurrences);
        }

        println!("{}", date.format("%A %Y-%m-%d"));
        if occurrences.is_empty() {
            println!("    (nothing scheduled)");
        }
        for occurrence in &occurrences {
            println!("    {}", self.describe(occurrence));
        }
        Ok(())
    }

    async fn update_settings(
        &self,
        first_day: Option<FirstDayOfWeek>,
        time_format: Option<TimeFormat>,
        weeks: Option<u32>,
        margin_months: Option<u32>,
    ) -> AppResult<()> {
        let mut settings = self.settings.clone();
        let changed = first_day.is_some() || time_format.is_some() || weeks.is_some() || margin_months.is_some();

        if let Some(value) = first_day {
            settings.first_day_of_week = value;
        }
        if let Some(value) = time_format {
            settings.time_format = value;
        }
        if let Some(value) = weeks {
            settings.visible_weeks = value;
        }
        if let Some(value) = margin_months {
            settings.fetch_margin_months = value;
        }
        if changed {
            self.db.update_settings(&settings).await?;
        }

        if self.json {
            return print_json(&settings);
        }
        println!("first_day_of_week   {}", settings.first_day_of_week);
        println!("time_format         {}", settings.time_format);
        println!("visible_weeks       {}", settings.visible_weeks);
        println!("fetch_margin_months {}", settings.fetch_margin_months);
        Ok(())
    }

    fn describe(&self, occurrence: &Occurrence) -> String {
        let event = &occurrence.event;
        let mut line = format!(
            "{:>8}  {}",
            time_format::occurrence_label(occurrence, self.settings.time_format),
            event.title
        );
        if event.kind == EventKind::Task {
            line.push_str(" [task]");
        }
        if event.is_recurring() {
            line.push_str(&format!(" ({})", event.recurrence));
        }
        line.push_str(&format!("  #{}", event.id));
        line
    }

    fn print_event(&self, event: &weekplan::CalendarEvent) -> AppResult<()> {
        if self.json {
            return print_json(event);
        }
        let when = match event.time {
            Some(time) => time_format::format_time(time, self.settings.time_format),
            None => "all day".to_string(),
        };
        println!(
            "{}  {} {} ({}, {})",
            event.id,
            date_utils::format_date(event.date),
            when,
            event.title,
            event.recurrence
        );
        Ok(())
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Anyhow(anyhow::Error::new(e)))?;
    println!("{}", rendered);
    Ok(())
}
