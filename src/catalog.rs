use std::path::Path;

use crate::local_storage::LocalStorage;
use crate::model::{CalendarData, CalendarInfo};
use crate::transfer;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use log::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Calendar `{0}` not found")]
    NotFound(String),
    #[error("Calendar name cannot be empty")]
    EmptyName,
}

/// The set of life calendars kept on this machine, with one of them selected as current.
/// Opening the catalog upgrades a database written in the old single-calendar format.
pub struct CalendarCatalog {
    storage: LocalStorage,
}

impl CalendarCatalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<CalendarCatalog> {
        Self::with_storage(LocalStorage::new(path)?)
    }

    pub fn test_new() -> Result<CalendarCatalog> {
        Self::with_storage(LocalStorage::test_new()?)
    }

    /// Wraps an already opened storage, running the legacy migration first.
    pub fn with_storage(storage: LocalStorage) -> Result<CalendarCatalog> {
        let catalog = CalendarCatalog { storage };
        catalog.migrate_legacy()?;
        Ok(catalog)
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// One-shot upgrade of the old single record.
    /// Events that don't pass validation are dropped and logged.
    /// Runs only when there is neither an index nor a current calendar, so once the
    /// migrated calendar is stored further calls are no-ops.
    /// Returns the migrated calendar, if the migration happened.
    pub fn migrate_legacy(&self) -> Result<Option<CalendarData>> {
        let has_index = !self.storage.get_calendar_list()?.is_empty();
        if has_index || self.storage.get_current_id()?.is_some() {
            return Ok(None);
        }
        let legacy = match self.storage.get_legacy() {
            Ok(Some(legacy)) => legacy,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Legacy calendar record is unreadable, skipping migration: {e}");
                return Ok(None);
            }
        };

        let id = format!("legacy-{}", Uuid::new_v4().simple());
        let Some(mut calendar) = legacy.into_calendar(id, Utc::now()) else {
            warn!("Legacy calendar record has no birth date, skipping migration");
            return Ok(None);
        };
        // Invalid events would make the migrated calendar impossible to save again
        calendar.events.retain(|event| match event.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping legacy event {} during migration: {e}", event.id);
                false
            }
        });

        self.storage.replace_legacy(&calendar)?;
        info!("Migrated legacy calendar into {}", calendar.id);
        Ok(Some(calendar))
    }

    pub fn list(&self) -> Result<Vec<CalendarInfo>> {
        self.storage.get_calendar_list()
    }

    pub fn current_id(&self) -> Result<Option<String>> {
        self.storage.get_current_id()
    }

    /// The selected calendar, `None` when nothing is selected or the record is gone.
    pub fn current(&self) -> Result<Option<CalendarData>> {
        match self.storage.get_current_id()? {
            Some(id) => self.storage.get_calendar(&id),
            None => Ok(None),
        }
    }

    pub fn load(&self, id: &str) -> Result<Option<CalendarData>> {
        self.storage.get_calendar(id)
    }

    /// Loads a calendar, failing with [`CatalogError::NotFound`] when it doesn't exist.
    pub fn get(&self, id: &str) -> Result<CalendarData> {
        self.storage
            .get_calendar(id)?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()).into())
    }

    pub fn select(&self, id: &str) -> Result<()> {
        if self.storage.get_calendar(id)?.is_none() {
            return Err(CatalogError::NotFound(id.to_string()).into());
        }
        self.storage.set_current_id(id)?;
        debug!("Selected calendar {id}");
        Ok(())
    }

    /// Creates an empty calendar and makes it current.
    pub fn create(&self, name: &str, birth_date: NaiveDate) -> Result<CalendarData> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName.into());
        }
        let id = format!("calendar-{}", Uuid::new_v4().simple());
        let calendar = CalendarData::new(id, name, birth_date, Utc::now());
        self.storage.save_calendar(&calendar)?;
        info!("Created calendar {} ({})", calendar.id, calendar.name);
        Ok(calendar)
    }

    /// Persists the calendar and makes it current. Refreshes `updated_at`.
    pub fn save(&self, calendar: &mut CalendarData) -> Result<()> {
        if calendar.name.trim().is_empty() {
            return Err(CatalogError::EmptyName.into());
        }
        calendar.validate_events()?;
        calendar.updated_at = Utc::now();
        self.storage.save_calendar(calendar)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.storage.delete_calendar(id)? {
            return Err(CatalogError::NotFound(id.to_string()).into());
        }
        info!("Deleted calendar {id}");
        Ok(())
    }

    pub fn export<P: AsRef<Path>>(&self, id: &str, path: P) -> Result<()> {
        let calendar = self.get(id)?;
        transfer::export_to_file(path.as_ref(), &calendar)?;
        info!("Exported calendar {id} to {}", path.as_ref().display());
        Ok(())
    }

    /// Reads a calendar file, stores it and makes it current.
    /// A calendar with the same id is overwritten.
    pub fn import<P: AsRef<Path>>(&self, path: P) -> Result<CalendarData> {
        let calendar = transfer::import_from_file(path.as_ref())?;
        calendar.validate_events()?;
        self.storage.save_calendar(&calendar)?;
        info!("Imported calendar {} from {}", calendar.id, path.as_ref().display());
        Ok(calendar)
    }
}
