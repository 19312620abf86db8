//! Portable calendar files.
//!
//! A file holds one calendar as JSON in the stored record layout. Reading is
//! lenient about bookkeeping fields: files written by the old single-calendar
//! version only carry `birthDate`, `events` and maybe `name`, the rest is
//! filled in on import.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::life_date::{format_date, parse_date};
use crate::model::{CalendarData, LifeEvent};

pub const IMPORTED_CALENDAR_NAME: &str = "Imported calendar";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read calendar file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Calendar file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Calendar file has no birth date")]
    MissingBirthDate,
    #[error("Calendar file has no events list")]
    EventsNotArray,
    #[error("Calendar file has an invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// File name offered for an export made on `today`.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("life-calendar-{}.json", format_date(today))
}

pub fn write_calendar<W: Write>(mut writer: W, calendar: &CalendarData) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, calendar)?;
    writer.flush()
}

pub fn export_to_file(path: &Path, calendar: &CalendarData) -> std::io::Result<()> {
    let file = File::create(path)?;
    write_calendar(BufWriter::new(file), calendar)
}

/// Parses and validates a calendar file, filling missing bookkeeping fields.
pub fn read_calendar<R: Read>(reader: R) -> Result<CalendarData, ImportError> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Object(fields) = value else {
        return Err(ImportError::InvalidField {
            field: "calendar",
            reason: "expected a JSON object".to_string(),
        });
    };
    calendar_from_fields(fields, Utc::now())
}

pub fn import_from_file(path: &Path) -> Result<CalendarData, ImportError> {
    let file = File::open(path)?;
    read_calendar(BufReader::new(file))
}

fn calendar_from_fields(
    mut fields: Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<CalendarData, ImportError> {
    let birth_date = match fields.get("birthDate") {
        Some(Value::String(raw)) if !raw.trim().is_empty() => {
            parse_date(raw).ok_or_else(|| ImportError::InvalidField {
                field: "birthDate",
                reason: format!("`{raw}` is not a date"),
            })?
        }
        _ => return Err(ImportError::MissingBirthDate),
    };

    let events = match fields.remove("events") {
        Some(events @ Value::Array(_)) => serde_json::from_value::<Vec<LifeEvent>>(events)
            .map_err(|e| ImportError::InvalidField {
                field: "events",
                reason: e.to_string(),
            })?,
        _ => return Err(ImportError::EventsNotArray),
    };

    let id = non_empty_string(&fields, "id")
        .unwrap_or_else(|| format!("imported-{}", Uuid::new_v4().simple()));
    let name = non_empty_string(&fields, "name").unwrap_or_else(|| IMPORTED_CALENDAR_NAME.to_string());
    let created_at = timestamp(&fields, "createdAt")?.unwrap_or(now);
    let updated_at = timestamp(&fields, "updatedAt")?.unwrap_or(now);

    Ok(CalendarData {
        id,
        name,
        birth_date,
        events,
        created_at,
        updated_at,
    })
}

fn non_empty_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn timestamp(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<DateTime<Utc>>, ImportError> {
    match non_empty_string(fields, key) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| ImportError::InvalidField {
                field: key,
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_export_file_name() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!("life-calendar-2024-03-09.json", export_file_name(today));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = read_calendar("[1, 2]".as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidField { field: "calendar", .. }));
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let json = r#"{"birthDate":"1990-01-01","events":[],"createdAt":"yesterday"}"#;
        let err = read_calendar(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidField { field: "createdAt", .. }));
    }
}
