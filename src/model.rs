//! Stored calendar records and the events overlaid on their weeks.
//!
//! Field names serialize in camelCase and event kinds as `"date"`/`"range"`,
//! the layout of files written by earlier versions of the calendar.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::life_date::{serde_date, serde_opt_date};
use crate::week_mapper::{week_position, weeks_in_range, WeekCoordinate};

pub const DEFAULT_CALENDAR_NAME: &str = "My calendar";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("event name cannot be empty")]
    EmptyName,
    #[error("range event `{0}` has no end date")]
    MissingEndDate(String),
    #[error("single date event `{0}` cannot have an end date")]
    UnexpectedEndDate(String),
    #[error("event `{id}` ends ({end}) before it starts ({start})")]
    EndBeforeStart {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("event `{0}` already exists")]
    DuplicateEvent(String),
    #[error("event `{0}` not found")]
    UnknownEvent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// A single day.
    Date,
    /// An inclusive span of days.
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub name: String,
    pub color: String,
    #[serde(with = "serde_date")]
    pub start_date: NaiveDate,
    #[serde(default, with = "serde_opt_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl LifeEvent {
    pub fn on_date<S: Into<String>, C: Into<String>>(name: S, color: C, date: NaiveDate) -> Self {
        LifeEvent {
            id: new_event_id(),
            kind: EventType::Date,
            name: name.into(),
            color: color.into(),
            start_date: date,
            end_date: None,
        }
    }

    pub fn spanning<S: Into<String>, C: Into<String>>(
        name: S,
        color: C,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        LifeEvent {
            id: new_event_id(),
            kind: EventType::Range,
            name: name.into(),
            color: color.into(),
            start_date: start,
            end_date: Some(end),
        }
    }

    pub fn validate(&self) -> Result<(), EventError> {
        if self.name.trim().is_empty() {
            return Err(EventError::EmptyName);
        }
        match (self.kind, self.end_date) {
            (EventType::Range, None) => Err(EventError::MissingEndDate(self.id.clone())),
            (EventType::Range, Some(end)) if end < self.start_date => {
                Err(EventError::EndBeforeStart {
                    id: self.id.clone(),
                    start: self.start_date,
                    end,
                })
            }
            (EventType::Date, Some(_)) => Err(EventError::UnexpectedEndDate(self.id.clone())),
            _ => Ok(()),
        }
    }

    /// Weeks of the life grid this event is drawn on.
    pub fn weeks(&self, birth: NaiveDate) -> Vec<WeekCoordinate> {
        match (self.kind, self.end_date) {
            (EventType::Range, Some(end)) => weeks_in_range(birth, self.start_date, end),
            _ => week_position(birth, self.start_date).into_iter().collect(),
        }
    }

    /// Same as `self.weeks(birth).contains(&coordinate)` without building the list.
    pub fn covers(&self, birth: NaiveDate, coordinate: WeekCoordinate) -> bool {
        match (self.kind, self.end_date) {
            (EventType::Range, Some(end)) => {
                match (week_position(birth, self.start_date), week_position(birth, end)) {
                    (Some(first), Some(last)) => {
                        coordinate.is_in_grid() && first <= coordinate && coordinate <= last
                    }
                    _ => false,
                }
            }
            _ => week_position(birth, self.start_date) == Some(coordinate),
        }
    }
}

fn new_event_id() -> String {
    format!("event-{}", uuid::Uuid::new_v4().simple())
}

/// A named life calendar: a birth date and its events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarData {
    pub id: String,
    pub name: String,
    #[serde(with = "serde_date")]
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub events: Vec<LifeEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarData {
    pub fn new<I: Into<String>, N: Into<String>>(
        id: I,
        name: N,
        birth_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        CalendarData {
            id: id.into(),
            name: name.into(),
            birth_date,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn info(&self) -> CalendarInfo {
        CalendarInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn validate_events(&self) -> Result<(), EventError> {
        self.events.iter().try_for_each(LifeEvent::validate)
    }

    pub fn event(&self, id: &str) -> Option<&LifeEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn add_event(&mut self, event: LifeEvent) -> Result<(), EventError> {
        event.validate()?;
        if self.event(&event.id).is_some() {
            return Err(EventError::DuplicateEvent(event.id));
        }
        self.events.push(event);
        Ok(())
    }

    /// Replaces the event with the same id, keeping its position.
    pub fn update_event(&mut self, event: LifeEvent) -> Result<(), EventError> {
        event.validate()?;
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                *slot = event;
                Ok(())
            }
            None => Err(EventError::UnknownEvent(event.id)),
        }
    }

    pub fn remove_event(&mut self, id: &str) -> Result<LifeEvent, EventError> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| EventError::UnknownEvent(id.to_string()))?;
        Ok(self.events.remove(index))
    }

    /// For every week that has at least one event, the events drawn on it in insertion order.
    pub fn week_overlay(&self) -> BTreeMap<WeekCoordinate, Vec<&LifeEvent>> {
        let mut overlay: BTreeMap<WeekCoordinate, Vec<&LifeEvent>> = BTreeMap::new();
        for event in &self.events {
            for coordinate in event.weeks(self.birth_date) {
                overlay.entry(coordinate).or_default().push(event);
            }
        }
        overlay
    }

    pub fn current_week(&self, today: NaiveDate) -> Option<WeekCoordinate> {
        week_position(self.birth_date, today)
    }
}

/// Entry of the calendar index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarInfo {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single calendar record written before multiple calendars were supported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCalendar {
    #[serde(default, with = "serde_opt_date", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<LifeEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LegacyCalendar {
    /// Converts into the current record format.
    /// Returns `None` when there is no birth date to build a calendar from.
    pub fn into_calendar(self, id: String, now: DateTime<Utc>) -> Option<CalendarData> {
        let birth_date = self.birth_date?;
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CALENDAR_NAME.to_string());
        let mut calendar = CalendarData::new(id, name, birth_date, now);
        calendar.events = self.events.unwrap_or_default();
        Some(calendar)
    }
}
