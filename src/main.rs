mod cli;
mod logger;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use life_calendar::catalog::CalendarCatalog;
use life_calendar::life_date::format_date;
use life_calendar::model::{CalendarData, LifeEvent};
use life_calendar::transfer::export_file_name;
use life_calendar::{date_from_week_position, week_position, weeks_in_range};

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    // Pure date commands don't need the database
    match &cli.command {
        Command::Position { birth, date } => {
            match week_position(*birth, *date) {
                Some(position) => println!("{position}"),
                None => println!("{} is outside of the life calendar", format_date(*date)),
            }
            return Ok(());
        }
        Command::Date { birth, year, week } => {
            let date = date_from_week_position(*birth, *year, *week)
                .context("Date is out of the supported range")?;
            println!("{}", format_date(date));
            return Ok(());
        }
        Command::Range { birth, start, end } => {
            for position in weeks_in_range(*birth, *start, *end) {
                println!("{position}");
            }
            return Ok(());
        }
        _ => {}
    }

    let catalog = CalendarCatalog::open(&cli.db)
        .with_context(|| format!("Failed to open {}", cli.db.display()))?;
    let current_id = catalog.current_id()?;

    match cli.command {
        Command::List => {
            for info in catalog.list()? {
                let marker = if current_id.as_deref() == Some(info.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {}  {}  (updated {})",
                    info.id,
                    info.name,
                    info.updated_at.to_rfc3339()
                );
            }
        }
        Command::Create { name, birth_date } => {
            let calendar = catalog.create(&name, birth_date)?;
            println!("{}", calendar.id);
        }
        Command::Select { id } => catalog.select(&id)?,
        Command::Delete { id } => catalog.delete(&id)?,
        Command::Show { id } => {
            let calendar = match id {
                Some(id) => catalog.get(&id)?,
                None => current(&catalog)?,
            };
            show(&calendar);
        }
        Command::AddEvent {
            name,
            start,
            end,
            color,
        } => {
            let mut calendar = current(&catalog)?;
            let event = match end {
                Some(end) => LifeEvent::spanning(name, color, start, end),
                None => LifeEvent::on_date(name, color, start),
            };
            let event_id = event.id.clone();
            calendar.add_event(event)?;
            catalog.save(&mut calendar)?;
            println!("{event_id}");
        }
        Command::RemoveEvent { event_id } => {
            let mut calendar = current(&catalog)?;
            calendar.remove_event(&event_id)?;
            catalog.save(&mut calendar)?;
        }
        Command::Export { path, id } => {
            let id = match id.or(current_id) {
                Some(id) => id,
                None => bail!("No calendar selected"),
            };
            let path = path.unwrap_or_else(|| export_file_name(Local::now().date_naive()).into());
            catalog.export(&id, &path)?;
            println!("{}", path.display());
        }
        Command::Import { path } => {
            let calendar = catalog.import(&path)?;
            println!("{}", calendar.id);
        }
        Command::Position { .. } | Command::Date { .. } | Command::Range { .. } => {}
    }

    Ok(())
}

fn current(catalog: &CalendarCatalog) -> Result<CalendarData> {
    match catalog.current()? {
        Some(calendar) => Ok(calendar),
        None => bail!("No calendar selected"),
    }
}

fn show(calendar: &CalendarData) {
    println!("{} ({})", calendar.name, calendar.id);
    println!("born {}", format_date(calendar.birth_date));
    match calendar.current_week(Local::now().date_naive()) {
        Some(position) => println!("today: {position}"),
        None => println!("today is outside of the life calendar"),
    }
    for event in &calendar.events {
        let dates = match event.end_date {
            Some(end) => format!("{} .. {}", format_date(event.start_date), format_date(end)),
            None => format_date(event.start_date),
        };
        let weeks = event.weeks(calendar.birth_date);
        let span = match (weeks.first(), weeks.last()) {
            (Some(first), Some(last)) if first == last => first.to_string(),
            (Some(first), Some(last)) => format!("{first} - {last}"),
            _ => "off the grid".to_string(),
        };
        println!(
            "  {}  {}  {}  {}  [{}]",
            event.id, event.name, event.color, dates, span
        );
    }
    let crowded = calendar
        .week_overlay()
        .into_iter()
        .filter(|(_, events)| events.len() > 1)
        .map(|(week, _)| week.to_string())
        .collect_vec();
    if !crowded.is_empty() {
        println!("weeks with overlapping events: {}", crowded.join(", "));
    }
}
