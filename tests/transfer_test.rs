mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use life_calendar::model::{CalendarData, EventType, LifeEvent};
use life_calendar::transfer::{
    export_to_file, import_from_file, read_calendar, write_calendar, ImportError,
    IMPORTED_CALENDAR_NAME,
};

#[test]
fn test_full_record_is_kept() -> Result<()> {
    let json = r##"{
        "id": "calendar-1",
        "name": "Mine",
        "birthDate": "1990-05-17",
        "events": [
            {"id": "e1", "type": "date", "name": "Moved", "color": "#ff0000", "startDate": "2001-02-03"},
            {"id": "e2", "type": "range", "name": "School", "color": "#00ff00",
             "startDate": "1997-09-01", "endDate": "2008-06-30"}
        ],
        "createdAt": "2024-01-02T03:04:05.000Z",
        "updatedAt": "2024-02-03T04:05:06.000Z"
    }"##;

    let calendar = read_calendar(json.as_bytes())?;

    assert_eq!("calendar-1", calendar.id);
    assert_eq!("Mine", calendar.name);
    assert_eq!(date!(1990, 5, 17), calendar.birth_date);
    assert_eq!(2, calendar.events.len());
    assert_eq!(EventType::Range, calendar.events[1].kind);
    assert_eq!(Some(date!(2008, 6, 30)), calendar.events[1].end_date);
    assert_eq!(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(), calendar.created_at);
    assert_eq!(Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap(), calendar.updated_at);

    Ok(())
}

#[test]
fn test_old_format_gets_defaults() -> Result<()> {
    let json = r#"{"birthDate": "1990-05-17T00:00:00.000Z", "events": []}"#;

    let before = Utc::now();
    let calendar = read_calendar(json.as_bytes())?;

    assert!(calendar.id.starts_with("imported-"));
    assert_eq!(IMPORTED_CALENDAR_NAME, calendar.name);
    assert_eq!(date!(1990, 5, 17), calendar.birth_date);
    assert!(calendar.created_at >= before);
    assert!(calendar.updated_at >= before);

    Ok(())
}

#[test]
fn test_missing_birth_date_is_rejected() {
    let err = read_calendar(r#"{"name": "x", "events": []}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::MissingBirthDate));

    let err = read_calendar(r#"{"birthDate": "", "events": []}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::MissingBirthDate));
}

#[test]
fn test_events_must_be_an_array() {
    let err = read_calendar(r#"{"birthDate": "1990-05-17"}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::EventsNotArray));

    let err = read_calendar(r#"{"birthDate": "1990-05-17", "events": {}}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::EventsNotArray));
}

#[test]
fn test_malformed_content_is_rejected() {
    let err = read_calendar("{not json".as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::Json(_)));

    let err = read_calendar(r#"{"birthDate": "17.05.1990", "events": []}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::InvalidField { field: "birthDate", .. }));

    let err = read_calendar(r#"{"birthDate": "1990-05-17", "events": [{"id": 1}]}"#.as_bytes())
        .unwrap_err();
    assert!(matches!(err, ImportError::InvalidField { field: "events", .. }));
}

#[test]
fn test_written_file_reads_back() -> Result<()> {
    let mut calendar = CalendarData::new("c1", "Mine", date!(2000, 2, 29), Utc::now());
    calendar.add_event(LifeEvent::spanning("Trip", "#abcdef", date!(2010, 7, 1), date!(2010, 7, 14)))?;

    let mut buffer = Vec::new();
    write_calendar(&mut buffer, &calendar)?;
    let text = String::from_utf8(buffer.clone())?;
    assert!(text.contains("\"birthDate\": \"2000-02-29\""));
    assert!(text.contains("\"type\": \"range\""));
    assert_eq!(calendar, read_calendar(buffer.as_slice())?);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("calendar.json");
    export_to_file(&path, &calendar)?;
    assert_eq!(calendar, import_from_file(&path)?);

    Ok(())
}

#[test]
fn test_missing_file() {
    let err = import_from_file(std::path::Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, ImportError::Io(_)));
}
