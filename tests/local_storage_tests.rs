mod common;

use chrono::Utc;
use life_calendar::local_storage::LocalStorage;
use life_calendar::model::{CalendarData, LegacyCalendar, LifeEvent};

fn calendar(id: &str, name: &str) -> CalendarData {
    CalendarData::new(id, name, date!(1990, 5, 17), Utc::now())
}

#[test]
fn test_empty_storage_reads_as_empty() -> anyhow::Result<()> {
    let sut = LocalStorage::test_new()?;

    assert!(sut.get_calendar_list()?.is_empty());
    assert_eq!(None, sut.get_current_id()?);
    assert_eq!(None, sut.get_calendar("missing")?);
    assert_eq!(None, sut.get_legacy()?);

    Ok(())
}

#[test]
fn test_save_calendar_updates_index_and_current() -> anyhow::Result<()> {
    let sut = LocalStorage::test_new()?;

    let mut first = calendar("c1", "First");
    first
        .add_event(LifeEvent::on_date("Graduation", "#ff0000", date!(2012, 6, 30)))
        .unwrap();
    sut.save_calendar(&first)?;
    sut.save_calendar(&calendar("c2", "Second"))?;

    assert_eq!(Some(first.clone()), sut.get_calendar("c1")?);
    assert_eq!(Some("c2".to_string()), sut.get_current_id()?);
    let ids: Vec<String> = sut.get_calendar_list()?.into_iter().map(|c| c.id).collect();
    assert_eq!(vec!["c1", "c2"], ids);

    Ok(())
}

#[test]
fn test_save_calendar_is_upsert() -> anyhow::Result<()> {
    let sut = LocalStorage::test_new()?;

    sut.save_calendar(&calendar("c1", "First"))?;
    sut.save_calendar(&calendar("c2", "Second"))?;
    sut.save_calendar(&calendar("c1", "Renamed"))?;

    let list = sut.get_calendar_list()?;
    assert_eq!(2, list.len());
    assert_eq!("c1", list[0].id);
    assert_eq!("Renamed", list[0].name);
    assert_eq!(Some("c1".to_string()), sut.get_current_id()?);

    Ok(())
}

#[test]
fn test_delete_current_falls_back_to_first() -> anyhow::Result<()> {
    let sut = LocalStorage::test_new()?;

    sut.save_calendar(&calendar("c1", "First"))?;
    sut.save_calendar(&calendar("c2", "Second"))?;
    sut.save_calendar(&calendar("c3", "Third"))?;
    assert_eq!(Some("c3".to_string()), sut.get_current_id()?);

    assert!(sut.delete_calendar("c3")?);
    assert_eq!(Some("c1".to_string()), sut.get_current_id()?);
    assert_eq!(None, sut.get_calendar("c3")?);

    // Deleting a non-current calendar keeps the pointer
    assert!(sut.delete_calendar("c2")?);
    assert_eq!(Some("c1".to_string()), sut.get_current_id()?);

    assert!(sut.delete_calendar("c1")?);
    assert_eq!(None, sut.get_current_id()?);
    assert!(sut.get_calendar_list()?.is_empty());

    assert!(!sut.delete_calendar("c1")?);

    Ok(())
}

#[test]
fn test_delete_unknown_id_changes_nothing() -> anyhow::Result<()> {
    let sut = LocalStorage::test_new()?;

    sut.save_calendar(&calendar("c1", "First"))?;
    sut.save_calendar(&calendar("c2", "Second"))?;
    sut.set_current_id("c1")?;
    let list_before = sut.get_calendar_list()?;

    assert!(!sut.delete_calendar("nope")?);

    assert_eq!(list_before, sut.get_calendar_list()?);
    assert_eq!(Some("c1".to_string()), sut.get_current_id()?);

    Ok(())
}

#[test]
fn test_current_pointer() -> anyhow::Result<()> {
    let sut = LocalStorage::test_new()?;

    sut.save_calendar(&calendar("c1", "First"))?;
    sut.save_calendar(&calendar("c2", "Second"))?;
    sut.set_current_id("c1")?;
    assert_eq!(Some("c1".to_string()), sut.get_current_id()?);

    sut.clear_current_id()?;
    assert_eq!(None, sut.get_current_id()?);

    Ok(())
}

#[test]
fn test_replace_legacy() -> anyhow::Result<()> {
    let sut = LocalStorage::test_new()?;

    let legacy = LegacyCalendar {
        birth_date: Some(date!(1980, 1, 1)),
        events: Some(vec![]),
        name: Some("Old".into()),
    };
    sut.put_legacy(&legacy)?;
    assert_eq!(Some(legacy), sut.get_legacy()?);

    let migrated = calendar("legacy-1", "Old");
    sut.replace_legacy(&migrated)?;

    assert_eq!(None, sut.get_legacy()?);
    assert_eq!(Some(migrated), sut.get_calendar("legacy-1")?);
    assert_eq!(Some("legacy-1".to_string()), sut.get_current_id()?);

    Ok(())
}

#[test]
fn test_records_survive_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("calendars.redb");

    {
        let sut = LocalStorage::new(&path)?;
        sut.save_calendar(&calendar("c1", "First"))?;
    }

    let sut = LocalStorage::new(&path)?;
    assert_eq!(1, sut.get_calendar_list()?.len());
    assert_eq!("First", sut.get_calendar("c1")?.unwrap().name);

    Ok(())
}
