//! Calendar date helpers shared by the week mapper and the stored records.
//!
//! Dates are plain calendar dates (`NaiveDate`), there is no time of day and
//! no time zone. A life-year starts on the birth month/day placed into a
//! calendar year. When that day does not exist in the target year
//! (Feb 29 in a common year) it overflows into the next month, e.g.
//! a 2000-02-29 birth date has its 2001 anniversary on 2001-03-01.
//!
//! Stored records carry dates as `YYYY-MM-DD` strings. Older files may carry
//! a full ISO date-time instead, so reading accepts both and only the calendar
//! part is kept.

use chrono::{Datelike, Days, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Places the month/day of `birth` into the given calendar year.
/// Returns `None` only when the result is outside of the `NaiveDate` range.
pub fn anniversary_in(birth: NaiveDate, calendar_year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(calendar_year, birth.month(), 1)?
        .checked_add_days(Days::new(u64::from(birth.day0())))
}

/// Anniversary that opens life-year `life_year` (0 is the birth date itself).
pub fn life_year_start(birth: NaiveDate, life_year: u32) -> Option<NaiveDate> {
    let calendar_year = birth.year().checked_add(i32::try_from(life_year).ok()?)?;
    anniversary_in(birth, calendar_year)
}

/// Number of full anniversary cycles completed by `target`.
/// Negative when `target` is before `birth`.
pub fn full_years_between(birth: NaiveDate, target: NaiveDate) -> i32 {
    let mut years = target.year() - birth.year();
    if (target.month(), target.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

/// Parses `YYYY-MM-DD`, or the date part of `YYYY-MM-DDTHH:MM:SS...`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }
    match value.get(10..11) {
        Some("T") | Some(" ") => NaiveDate::parse_from_str(&value[..10], DATE_FORMAT).ok(),
        _ => None,
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Serde adapter for required date fields.
pub mod serde_date {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date `{raw}`")))
    }
}

/// Serde adapter for optional date fields. Empty strings read as `None`.
pub mod serde_opt_date {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_some(&super::format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date `{raw}`"))),
        }
    }
}
