//! Clock-time handling for prayer timetables.
//!
//! The source publishes every time as an "HH:MM" string with no date
//! attached. Timetables are always read relative to a known calendar day,
//! so a bare time of day is all we need here.

use std::fmt;

use chrono::{Local, NaiveDate, NaiveTime, Timelike};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day read from a timetable.
///
/// # Examples
///
/// ```
/// use masjid_times::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("05:10").unwrap();
/// assert_eq!(t.to_string(), "05:10");
/// assert_eq!(t.minutes_from_midnight(), 310);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parse a time from "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use masjid_times::domain::ClockTime;
    ///
    /// // Valid times
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// // Invalid formats
    /// assert!(ClockTime::parse_hhmm("0510").is_err());
    /// assert!(ClockTime::parse_hhmm("5:10").is_err());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// assert!(ClockTime::parse_hhmm("caca").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 bytes: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| TimeError::new("invalid time"))?;

        Ok(Self(time))
    }

    /// Returns true if `s` is a well-formed "HH:MM" time.
    ///
    /// Timetable rows sometimes carry decorative tokens before the times;
    /// this is the filter used to discard them.
    pub fn is_clock(s: &str) -> bool {
        Self::parse_hhmm(s).is_ok()
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since 00:00.
    pub fn minutes_from_midnight(&self) -> i64 {
        i64::from(self.hour()) * 60 + i64::from(self.minute())
    }

    /// Signed number of whole minutes from `self` to `later`.
    ///
    /// Negative when `later` is actually earlier in the day. No midnight
    /// wrapping is applied: both times belong to the same day.
    pub fn minutes_until(&self, later: ClockTime) -> i64 {
        later.minutes_from_midnight() - self.minutes_from_midnight()
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// Source of "today" for views that depend on the wall clock.
pub trait Clock: Send + Sync {
    /// The current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the server's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen on one date, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        let t = ClockTime::parse_hhmm("19:40").unwrap();
        assert_eq!(t.hour(), 19);
        assert_eq!(t.minute(), 40);
    }

    #[test]
    fn reject_malformed() {
        assert!(ClockTime::parse_hhmm("").is_err());
        assert!(ClockTime::parse_hhmm("12-30").is_err());
        assert!(ClockTime::parse_hhmm("1a:30").is_err());
        assert!(ClockTime::parse_hhmm("12:60").is_err());
        assert!(ClockTime::parse_hhmm(" 5:10").is_err());
    }

    #[test]
    fn reject_multibyte_without_panic() {
        // Five bytes, but not an ASCII layout
        assert!(ClockTime::parse_hhmm("é:12").is_err());
        assert!(ClockTime::parse_hhmm("١٢:٣").is_err());
    }

    #[test]
    fn minutes_until_is_signed() {
        let adhan = ClockTime::parse_hhmm("05:15").unwrap();
        let iqama = ClockTime::parse_hhmm("05:10").unwrap();
        assert_eq!(adhan.minutes_until(iqama), -5);
        assert_eq!(iqama.minutes_until(adhan), 5);
    }

    #[test]
    fn error_display() {
        let err = ClockTime::parse_hhmm("25:00").unwrap_err();
        assert_eq!(err.to_string(), "invalid time: hour must be 0-23");
    }

    #[test]
    fn fixed_clock_returns_its_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(FixedClock(date).today(), date);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn minutes_until_is_antisymmetric(a in 0u32..1440, b in 0u32..1440) {
            let ta = ClockTime::parse_hhmm(&format!("{:02}:{:02}", a / 60, a % 60)).unwrap();
            let tb = ClockTime::parse_hhmm(&format!("{:02}:{:02}", b / 60, b % 60)).unwrap();
            prop_assert_eq!(ta.minutes_until(tb), -tb.minutes_until(ta));
            prop_assert_eq!(ta.minutes_until(tb), i64::from(b) - i64::from(a));
        }

        #[test]
        fn arbitrary_strings_never_panic(s in ".{0,8}") {
            let _ = ClockTime::parse_hhmm(&s);
        }
    }
}
