use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[clap(bin_name = env!("CARGO_PKG_NAME"), version = env!("CARGO_PKG_VERSION"), about = "Life calendar: your life in weeks")]
pub struct Cli {
    /// Path to the calendar database
    #[clap(long, env = "LIFE_CALENDAR_DB", default_value = "life-calendar.redb")]
    pub db: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List stored calendars
    List,
    /// Create a calendar and select it
    Create {
        name: String,
        #[clap(value_parser = parse_date)]
        birth_date: NaiveDate,
    },
    /// Select the current calendar
    Select { id: String },
    /// Delete a calendar
    Delete { id: String },
    /// Print a calendar, its events and the week of today
    Show { id: Option<String> },
    /// Add an event to the current calendar
    AddEvent {
        name: String,
        #[clap(value_parser = parse_date)]
        start: NaiveDate,
        /// Last day of a range event; a single day event when omitted
        #[clap(long, value_parser = parse_date)]
        end: Option<NaiveDate>,
        #[clap(long, default_value = "#3b82f6")]
        color: String,
    },
    /// Remove an event from the current calendar
    RemoveEvent { event_id: String },
    /// Export a calendar (the current one by default) to a JSON file
    Export {
        /// Target file, `life-calendar-<today>.json` when omitted
        path: Option<PathBuf>,
        #[clap(long)]
        id: Option<String>,
    },
    /// Import a calendar from a JSON file and select it
    Import { path: PathBuf },
    /// Week coordinate of a date
    Position {
        #[clap(value_parser = parse_date)]
        birth: NaiveDate,
        #[clap(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// First day of a week coordinate
    Date {
        #[clap(value_parser = parse_date)]
        birth: NaiveDate,
        year: u32,
        week: u32,
    },
    /// Week coordinates covered by a date range
    Range {
        #[clap(value_parser = parse_date)]
        birth: NaiveDate,
        #[clap(value_parser = parse_date)]
        start: NaiveDate,
        #[clap(value_parser = parse_date)]
        end: NaiveDate,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    life_calendar::life_date::parse_date(value)
        .ok_or_else(|| format!("`{value}` is not a YYYY-MM-DD date"))
}
