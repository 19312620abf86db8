//! Mapping between calendar dates and `(life-year, week)` coordinates.
//!
//! The grid has [`LIFE_YEARS`] rows of [`WEEKS_PER_YEAR`] weeks. Every row
//! starts on the birth anniversary of its calendar year, so leap days and
//! month lengths are absorbed inside a single row instead of drifting
//! across the whole grid. A life-year is 365 or 366 days long, which is one
//! or two days more than 52 weeks; those trailing days are clamped into the
//! last week of the row.
//!
//! All functions here are pure. Dates outside of the grid (before birth or
//! on/after the 90th anniversary) have no coordinate and are reported as
//! `None` or as an empty sequence.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::life_date::{full_years_between, life_year_start};

pub const LIFE_YEARS: u32 = 90;
pub const WEEKS_PER_YEAR: u32 = 52;
pub const DAYS_PER_WEEK: i64 = 7;

/// Position of a week on the life grid.
/// Field order matters: the derived `Ord` is lexicographic by `(year, week)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekCoordinate {
    /// Life-year, `0..LIFE_YEARS`.
    pub year: u32,
    /// Week within the life-year, `0..WEEKS_PER_YEAR`.
    pub week: u32,
}

impl WeekCoordinate {
    pub const fn new(year: u32, week: u32) -> Self {
        WeekCoordinate { year, week }
    }

    pub const fn is_in_grid(&self) -> bool {
        self.year < LIFE_YEARS && self.week < WEEKS_PER_YEAR
    }

    /// The coordinate that follows this one in row-major order,
    /// `None` past the last week of the last life-year.
    pub fn next(&self) -> Option<WeekCoordinate> {
        if !self.is_in_grid() {
            return None;
        }
        let following = if self.week + 1 >= WEEKS_PER_YEAR {
            WeekCoordinate::new(self.year + 1, 0)
        } else {
            WeekCoordinate::new(self.year, self.week + 1)
        };
        following.is_in_grid().then_some(following)
    }
}

impl fmt::Display for WeekCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year {} week {}", self.year, self.week)
    }
}

/// Number of complete 7-day periods from `start` to `end`.
/// Negative when `end` is earlier than `start`; rounds towards negative infinity.
pub fn weeks_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().div_euclid(DAYS_PER_WEEK)
}

/// Coordinate of the week containing `target` for a life starting at `birth`.
pub fn week_position(birth: NaiveDate, target: NaiveDate) -> Option<WeekCoordinate> {
    let years_passed = u32::try_from(full_years_between(birth, target)).ok()?;
    if years_passed >= LIFE_YEARS {
        return None;
    }

    let year_start = life_year_start(birth, years_passed)?;
    let week = match u32::try_from(weeks_between(year_start, target)) {
        Ok(week) if week < WEEKS_PER_YEAR => week,
        // 365th/366th day of the life-year, or a negative count which the
        // anniversary arithmetic above never produces.
        _ => WEEKS_PER_YEAR - 1,
    };

    Some(WeekCoordinate::new(years_passed, week))
}

/// First day of the week at `(year, week)`.
///
/// Bounds are not checked, any `year`/`week` is projected from the birth
/// anniversary. For a clamped week 51 the result is the start of that week,
/// not the clamped date itself. `None` only when the date is not
/// representable.
pub fn date_from_week_position(birth: NaiveDate, year: u32, week: u32) -> Option<NaiveDate> {
    life_year_start(birth, year)?.checked_add_days(Days::new(u64::from(week) * 7))
}

/// Every week touched by the inclusive range `start..=end`, ascending.
///
/// When either end lies outside the grid nothing is returned, partial
/// ranges are not clipped. A reversed range is empty as well.
pub fn weeks_in_range(birth: NaiveDate, start: NaiveDate, end: NaiveDate) -> Vec<WeekCoordinate> {
    let (Some(first), Some(last)) = (week_position(birth, start), week_position(birth, end)) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut current = Some(first);
    while let Some(coordinate) = current {
        if coordinate > last {
            break;
        }
        weeks.push(coordinate);
        current = coordinate.next();
    }
    weeks
}

/// Whether `target` falls into the week `(year, week)`.
pub fn is_date_in_week(birth: NaiveDate, target: NaiveDate, year: u32, week: u32) -> bool {
    week_position(birth, target) == Some(WeekCoordinate::new(year, week))
}
