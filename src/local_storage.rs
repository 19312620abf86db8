use crate::model::{CalendarData, CalendarInfo, LegacyCalendar};
use anyhow::Result;
use log::debug;
use redb::{backends::InMemoryBackend, TableError};
use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Calendar records keyed by calendar id, stored as JSON.
const TBL_CALENDARS: TableDefinition<&str, &str> = TableDefinition::new("calendars");

/// Small bookkeeping values that are not records on their own:
///
///  calendars_list    -> [CalendarInfo] in creation order
///  current_calendar  -> id of the selected calendar
///  legacy_calendar   -> the single record of the old format, if never migrated
///
const TBL_META: TableDefinition<&str, &str> = TableDefinition::new("meta");

const KEY_CALENDARS_LIST: &str = "calendars_list";
const KEY_CURRENT_CALENDAR: &str = "current_calendar";
const KEY_LEGACY_CALENDAR: &str = "legacy_calendar";

/// Durable local storage of life calendars.
/// Every operation that touches more than one key (record, index, current pointer)
/// runs inside a single write transaction, so the index never points to a missing record.
pub struct LocalStorage {
    db: Database,
}

impl LocalStorage {
    /// Create a new instance of the local storage
    /// Args:
    /// * path - local DB file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Database::create(path)?;
        // redb will automatically detect and recover from crashes,
        // power loss, and other unclean shutdowns.
        Ok(LocalStorage { db })
    }

    /// In memory version of storage, for testing purposes
    pub fn test_new() -> Result<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Ok(LocalStorage { db })
    }

    pub fn get_calendar(&self, id: &str) -> Result<Option<CalendarData>> {
        let read_txn = self.db.begin_read()?;
        let table_calendars = match read_txn.open_table(TBL_CALENDARS) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(..)) => return Ok(None),
            Err(other) => return Err(other.into()),
        };
        let result = match table_calendars.get(id)? {
            Some(json) => Some(serde_json::from_str(json.value())?),
            None => None,
        };
        Ok(result)
    }

    /// Index of stored calendars, in the order they were first saved.
    pub fn get_calendar_list(&self) -> Result<Vec<CalendarInfo>> {
        Ok(self.get_meta(KEY_CALENDARS_LIST)?.unwrap_or_default())
    }

    pub fn get_current_id(&self) -> Result<Option<String>> {
        self.get_meta(KEY_CURRENT_CALENDAR)
    }

    pub fn set_current_id(&self, id: &str) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        put_meta(&write_txn, KEY_CURRENT_CALENDAR, &id)?;
        write_txn.commit()?;
        Ok(())
    }

    pub fn clear_current_id(&self) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        remove_meta(&write_txn, KEY_CURRENT_CALENDAR)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Stores the record, inserts or refreshes its index entry and makes it current.
    pub fn save_calendar(&self, calendar: &CalendarData) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        Self::write_calendar(&write_txn, calendar)?;
        write_txn.commit()?;
        debug!("Saved calendar {}", calendar.id);
        Ok(())
    }

    /// Removes the record and its index entry.
    /// If it was the current calendar, the first remaining one becomes current.
    /// Returns false, without writing anything, if neither the record, an index entry
    /// nor the current pointer refer to `id`.
    pub fn delete_calendar(&self, id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let removed_record = {
            let mut table_calendars = write_txn.open_table(TBL_CALENDARS)?;
            let removed = table_calendars.remove(id)?.is_some();
            removed
        };

        let list: Vec<CalendarInfo> = read_meta(&write_txn, KEY_CALENDARS_LIST)?.unwrap_or_default();
        let (removed_entries, remaining): (Vec<CalendarInfo>, Vec<CalendarInfo>) =
            list.into_iter().partition(|c| c.id == id);
        let current: Option<String> = read_meta(&write_txn, KEY_CURRENT_CALENDAR)?;
        let was_current = current.as_deref() == Some(id);

        let existed = removed_record || !removed_entries.is_empty() || was_current;
        if !existed {
            // Nothing refers to this id, leave the database untouched
            write_txn.abort()?;
            return Ok(false);
        }

        put_meta(&write_txn, KEY_CALENDARS_LIST, &remaining)?;
        if was_current {
            match remaining.first() {
                Some(first) => put_meta(&write_txn, KEY_CURRENT_CALENDAR, &first.id)?,
                None => remove_meta(&write_txn, KEY_CURRENT_CALENDAR)?,
            }
        }
        write_txn.commit()?;

        debug!("Deleted calendar {id}");
        Ok(true)
    }

    pub fn get_legacy(&self) -> Result<Option<LegacyCalendar>> {
        self.get_meta(KEY_LEGACY_CALENDAR)
    }

    /// Writes a record in the old single-calendar format.
    pub fn put_legacy(&self, legacy: &LegacyCalendar) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        put_meta(&write_txn, KEY_LEGACY_CALENDAR, legacy)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Stores the calendar converted from the legacy record as current
    /// and drops the legacy record, all or nothing.
    pub fn replace_legacy(&self, calendar: &CalendarData) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        Self::write_calendar(&write_txn, calendar)?;
        remove_meta(&write_txn, KEY_LEGACY_CALENDAR)?;
        write_txn.commit()?;
        Ok(())
    }

    fn write_calendar(txn: &WriteTransaction, calendar: &CalendarData) -> Result<()> {
        {
            let mut table_calendars = txn.open_table(TBL_CALENDARS)?;
            let json = serde_json::to_string(calendar)?;
            table_calendars.insert(calendar.id.as_str(), json.as_str())?;
        }

        let mut list: Vec<CalendarInfo> = read_meta(txn, KEY_CALENDARS_LIST)?.unwrap_or_default();
        let info = calendar.info();
        match list.iter_mut().find(|c| c.id == calendar.id) {
            Some(existing) => *existing = info,
            None => list.push(info),
        }
        put_meta(txn, KEY_CALENDARS_LIST, &list)?;
        put_meta(txn, KEY_CURRENT_CALENDAR, &calendar.id)?;
        Ok(())
    }

    fn get_meta<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table_meta = match read_txn.open_table(TBL_META) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(..)) => return Ok(None),
            Err(other) => return Err(other.into()),
        };
        let result = match table_meta.get(key)? {
            Some(json) => Some(serde_json::from_str(json.value())?),
            None => None,
        };
        Ok(result)
    }
}

/// Reads a meta value from inside a write transaction, so the read sees uncommitted writes.
fn read_meta<T: DeserializeOwned>(txn: &WriteTransaction, key: &str) -> Result<Option<T>> {
    let table_meta = txn.open_table(TBL_META)?;
    let result = match table_meta.get(key)? {
        Some(json) => Some(serde_json::from_str(json.value())?),
        None => None,
    };
    Ok(result)
}

fn put_meta<T: Serialize + ?Sized>(txn: &WriteTransaction, key: &str, value: &T) -> Result<()> {
    let mut table_meta = txn.open_table(TBL_META)?;
    let json = serde_json::to_string(value)?;
    table_meta.insert(key, json.as_str())?;
    Ok(())
}

fn remove_meta(txn: &WriteTransaction, key: &str) -> Result<()> {
    let mut table_meta = txn.open_table(TBL_META)?;
    table_meta.remove(key)?;
    Ok(())
}
