//! Month-year (`MM-YYYY`) dates.
//!
//! Subscriptions are billed per calendar month, so every date in the system is
//! the first instant of a month in UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a MM-YYYY month")]
pub struct MonthYearError(pub String);

/// First instant of `year`-`month` in UTC.
pub fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Truncate an instant to the first instant of its month.
pub fn truncate_to_month(instant: DateTime<Utc>) -> DateTime<Utc> {
    month_start(instant.year(), instant.month()).unwrap_or(instant)
}

/// Parse `MM-YYYY` (two-digit month, four-digit year).
pub fn parse_month_year(raw: &str) -> Result<DateTime<Utc>, MonthYearError> {
    let malformed = || MonthYearError(raw.to_string());

    let (month, year) = raw.split_once('-').ok_or_else(malformed)?;
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(month, 2) || !digits(year, 4) {
        return Err(malformed());
    }

    let month: u32 = month.parse().map_err(|_| malformed())?;
    let year: i32 = year.parse().map_err(|_| malformed())?;
    month_start(year, month).ok_or_else(malformed)
}

pub fn format_month_year(instant: &DateTime<Utc>) -> String {
    instant.format("%m-%Y").to_string()
}
