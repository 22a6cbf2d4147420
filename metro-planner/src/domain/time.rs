//! Clock handling for metro schedules.
//!
//! Timetables provide departures as hour/minute pairs. This module provides
//! a date-aware clock type for working with those times, handling trips and
//! schedule shifts that cross midnight.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;

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

/// Convert fractional minutes to a chrono `Duration`.
///
/// Segment times are accumulated in fractional minutes (dwell time is half a
/// minute), so clock arithmetic rounds to whole seconds.
pub fn minutes(mins: f64) -> Duration {
    Duration::seconds((mins * 60.0).round() as i64)
}

/// A date-aware clock time for metro trips.
///
/// Trip times need to track both the time of day and the date: a journey
/// boarded late in the evening can arrive after midnight, and a missed last
/// train waits for the next day's first departure.
///
/// # Examples
///
/// ```
/// use metro_planner::domain::TransitTime;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let time = TransitTime::parse_hhmm("14:30", date).unwrap();
/// assert_eq!(time.to_string(), "14:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitTime {
    datetime: NaiveDateTime,
}

impl TransitTime {
    /// Create a new TransitTime from date and time components.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            datetime: date.and_time(time),
        }
    }

    /// Create a TransitTime from a datetime.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self { datetime }
    }

    /// Parse a time from "HH:MM" format with a given base date.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_planner::domain::TransitTime;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    ///
    /// assert!(TransitTime::parse_hhmm("00:00", date).is_ok());
    /// assert!(TransitTime::parse_hhmm("23:59", date).is_ok());
    ///
    /// assert!(TransitTime::parse_hhmm("1430", date).is_err());
    /// assert!(TransitTime::parse_hhmm("25:00", date).is_err());
    /// ```
    pub fn parse_hhmm(s: &str, date: NaiveDate) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
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

        Ok(Self::new(date, time))
    }

    /// Returns the date component.
    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.datetime.minute()
    }

    /// Converts to a NaiveDateTime.
    pub fn to_datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    /// Advance this time by a number of fractional minutes.
    ///
    /// This properly handles crossing midnight by advancing the date.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_planner::domain::TransitTime;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let time = TransitTime::parse_hhmm("23:30", date).unwrap();
    ///
    /// let later = time.plus_minutes(60.0);
    /// assert_eq!(later.to_string(), "00:30");
    /// assert_eq!(later.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    /// ```
    pub fn plus_minutes(&self, mins: f64) -> Self {
        Self {
            datetime: self.datetime + minutes(mins),
        }
    }

    /// Returns the fractional minutes between two times.
    ///
    /// Negative when `other` is after `self`.
    pub fn minutes_since(&self, other: Self) -> f64 {
        let delta = self.datetime.signed_duration_since(other.datetime);
        delta.num_seconds() as f64 / 60.0
    }

    /// Returns the next calendar day at the same time of day.
    pub fn next_day(&self) -> Self {
        Self {
            datetime: self.datetime + Duration::days(1),
        }
    }
}

impl Ord for TransitTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.datetime.cmp(&other.datetime)
    }
}

impl PartialOrd for TransitTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for TransitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransitTime({} {:02}:{:02})",
            self.date(),
            self.hour(),
            self.minute()
        )
    }
}

impl fmt::Display for TransitTime {
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
