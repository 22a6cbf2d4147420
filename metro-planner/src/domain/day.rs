//! Timetable day-type variants.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use std::fmt;

/// Which timetable variant applies: workday or weekend.
///
/// Raw timetable data keys its departure tables by this value, so it
/// deserializes directly from the dataset's `"workday"` / `"weekend"` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum DayType {
    #[serde(rename = "workday")]
    Workday,
    #[serde(rename = "weekend")]
    Weekend,
}

impl DayType {
    /// The dataset key for this day type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Workday => "workday",
            DayType::Weekend => "weekend",
        }
    }

    /// Derive the day type from a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Workday,
        }
    }

    /// Parse from the dataset key.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "workday" => Some(DayType::Workday),
            "weekend" => Some(DayType::Weekend),
            _ => None,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_date_classifies_weekdays() {
        // 2024-03-15 is a Friday, 2024-03-16 a Saturday
        let friday = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();

        assert_eq!(DayType::from_date(friday), DayType::Workday);
        assert_eq!(DayType::from_date(saturday), DayType::Weekend);
        assert_eq!(DayType::from_date(sunday), DayType::Weekend);
    }

    #[test]
    fn parse_roundtrips_with_as_str() {
        for day in [DayType::Workday, DayType::Weekend] {
            assert_eq!(DayType::parse(day.as_str()), Some(day));
        }
        assert_eq!(DayType::parse("holiday"), None);
    }
}
