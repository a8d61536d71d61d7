//! Calendar views over a confData payload.
//!
//! The payload's `calendar` holds twelve monthly tables, each mapping a
//! day-of-month key to a row of clock strings. Rows may start with
//! decorative tokens; only well-formed "HH:MM" tokens are kept and then
//! assigned to columns by position.

use chrono::{Datelike, NaiveDate};

use crate::domain::{ClockTime, ConfData, DayTimes, MonthTable};
use crate::error::PrayerError;

/// Number of columns in a complete timetable row.
pub const DAY_COLUMNS: usize = 6;

/// Keep only the well-formed clock tokens of a raw row, in order.
///
/// # Examples
///
/// ```
/// use masjid_times::calendar::clock_tokens;
///
/// let raw: Vec<String> = ["caca", "05:10", "06:20"].map(String::from).to_vec();
/// assert_eq!(clock_tokens(&raw), vec!["05:10", "06:20"]);
/// ```
pub fn clock_tokens(raw: &[String]) -> Vec<&str> {
    raw.iter()
        .map(String::as_str)
        .filter(|t| ClockTime::is_clock(t))
        .collect()
}

/// The table for a 1-based month number.
///
/// # Errors
///
/// * `InvalidArgument` if `month` is outside 1..=12
/// * `DataIncomplete` if the payload has no table for that month
pub fn month_table(conf: &ConfData, month: i32) -> Result<&MonthTable, PrayerError> {
    if !(1..=12).contains(&month) {
        return Err(PrayerError::InvalidArgument(format!(
            "month {month} out of range 1-12"
        )));
    }

    // In range 1..=12, so the cast is lossless
    let index = (month - 1) as usize;
    conf.calendar.get(index).ok_or_else(|| {
        PrayerError::DataIncomplete(format!(
            "calendar has {} months, month {month} missing",
            conf.calendar.len()
        ))
    })
}

/// Filtered clock tokens for one day. A day absent from its month is empty.
pub fn day_tokens(conf: &ConfData, month: i32, day: u32) -> Result<Vec<&str>, PrayerError> {
    let table = month_table(conf, month)?;
    Ok(table.day(day).map(clock_tokens).unwrap_or_default())
}

/// Filtered clock tokens for a calendar date.
///
/// The date's own month is used, so the day after the last of a month is
/// read from the following month's table. The payload is a single year:
/// 1 January is read from the first table whatever the year.
pub fn date_tokens(conf: &ConfData, date: NaiveDate) -> Result<Vec<&str>, PrayerError> {
    // month() is 1..=12
    day_tokens(conf, date.month() as i32, date.day())
}

/// Timetable for one day, strictly validated.
///
/// # Errors
///
/// * `InvalidArgument` if `month` is outside 1..=12 or `day` outside 1..=31
/// * `DataIncomplete` if fewer than six clock times remain after filtering
pub fn day_view(conf: &ConfData, month: i32, day: u32) -> Result<DayTimes, PrayerError> {
    if !(1..=31).contains(&day) {
        return Err(PrayerError::InvalidArgument(format!(
            "day {day} out of range 1-31"
        )));
    }

    let tokens = day_tokens(conf, month, day)?;
    if tokens.len() < DAY_COLUMNS {
        return Err(PrayerError::DataIncomplete(format!(
            "{month}/{day} has {} valid times, expected {DAY_COLUMNS}",
            tokens.len()
        )));
    }

    Ok(DayTimes::from_clock_tokens(&tokens))
}

/// Timetable for a calendar date, strictly validated.
pub fn date_view(conf: &ConfData, date: NaiveDate) -> Result<DayTimes, PrayerError> {
    day_view(conf, date.month() as i32, date.day())
}

/// Every day of a month, in the payload's key order.
///
/// Rows are assigned leniently: missing columns are empty strings.
///
/// # Errors
///
/// * `InvalidArgument` if `month` is outside 1..=12
/// * `DataIncomplete` if the payload has no table for that month
pub fn month_view(conf: &ConfData, month: i32) -> Result<Vec<DayTimes>, PrayerError> {
    let table = month_table(conf, month)?;
    Ok(table
        .iter()
        .map(|(_, raw)| DayTimes::from_clock_tokens(&clock_tokens(raw)))
        .collect())
}

/// All twelve months.
pub fn year_view(conf: &ConfData) -> Result<Vec<Vec<DayTimes>>, PrayerError> {
    (1..=12).map(|month| month_view(conf, month)).collect()
}
