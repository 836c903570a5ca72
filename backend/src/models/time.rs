//! Weekday and time-of-day primitives.
//!
//! Both types validate on construction and on deserialization, so data that
//! reaches the solver is always in range.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{RosterError, RosterResult};

/// Number of staffed weekdays (Monday through Friday).
pub const DAYS_PER_WEEK: u8 = 5;

const MINUTES_PER_HOUR: u16 = 60;

/// Helpdesk day of week, `0` = Monday through `4` = Friday.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const MONDAY: DayOfWeek = DayOfWeek(0);
    pub const TUESDAY: DayOfWeek = DayOfWeek(1);
    pub const WEDNESDAY: DayOfWeek = DayOfWeek(2);
    pub const THURSDAY: DayOfWeek = DayOfWeek(3);
    pub const FRIDAY: DayOfWeek = DayOfWeek(4);

    pub fn new(index: u8) -> RosterResult<Self> {
        if index < DAYS_PER_WEEK {
            Ok(DayOfWeek(index))
        } else {
            Err(RosterError::DayOutOfRange(index))
        }
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    /// All staffed weekdays in order.
    pub fn all() -> impl Iterator<Item = DayOfWeek> {
        (0..DAYS_PER_WEEK).map(DayOfWeek)
    }

    pub fn to_weekday(&self) -> Weekday {
        match self.0 {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            _ => Weekday::Fri,
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = RosterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DayOfWeek::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            0 => "Monday",
            1 => "Tuesday",
            2 => "Wednesday",
            3 => "Thursday",
            _ => "Friday",
        };
        f.write_str(name)
    }
}

/// A wall-clock time within one day at minute precision.
///
/// Parses `HH:MM` (shift templates) and `HH:MM:SS` (assignment records).
/// Serializes as `HH:MM`; use [`hms`] for the seconds form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn from_hm(hour: u8, minute: u8) -> RosterResult<Self> {
        NaiveTime::from_hms_opt(hour as u32, minute as u32, 0)
            .map(TimeOfDay)
            .ok_or_else(|| RosterError::InvalidTimeOfDay {
                value: format!("{:02}:{:02}", hour, minute),
                reason: "hour must be 0-23 and minute 0-59".to_string(),
            })
    }

    pub fn hour(&self) -> u8 {
        self.0.hour() as u8
    }

    pub fn minute(&self) -> u8 {
        self.0.minute() as u8
    }

    /// Minutes since midnight.
    pub fn minutes_since_midnight(&self) -> u16 {
        self.hour() as u16 * MINUTES_PER_HOUR + self.minute() as u16
    }

    /// Minutes from `self` until `end`, zero when `end` is not later.
    pub fn minutes_until(&self, end: TimeOfDay) -> u32 {
        end.minutes_since_midnight()
            .saturating_sub(self.minutes_since_midnight()) as u32
    }

    /// Whole hours touched by the window `[self, end)`.
    ///
    /// A window ending part-way through an hour still touches that hour, so
    /// `08:30-10:15` covers hours 8, 9 and 10.
    pub fn hours_until(&self, end: TimeOfDay) -> Range<u8> {
        let first = self.hour();
        let last = end.minutes_since_midnight().div_ceil(MINUTES_PER_HOUR).min(24) as u8;
        first..last.max(first)
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        self.0
    }

    /// `HH:MM:SS` rendering used by assignment records.
    pub fn to_hms_string(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}

impl FromStr for TimeOfDay {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RosterError::InvalidTimeOfDay {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map_err(|e| invalid(&format!("expected HH:MM or HH:MM:SS ({})", e)))?;

        // Leap seconds surface as a nanosecond overflow.
        if time.second() != 0 || time.nanosecond() != 0 {
            return Err(invalid("sub-minute precision is not supported"));
        }
        Ok(TimeOfDay(time))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = RosterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Serde adapter writing [`TimeOfDay`] as `HH:MM:SS`.
///
/// Reading accepts both `HH:MM` and `HH:MM:SS`.
pub mod hms {
    use super::TimeOfDay;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &TimeOfDay, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.to_hms_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeOfDay, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hh_mm() {
        let t: TimeOfDay = "08:30".parse().unwrap();
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.to_string(), "08:30");
        assert_eq!(t.to_hms_string(), "08:30:00");
    }

    #[test]
    fn test_parse_hh_mm_ss() {
        let t: TimeOfDay = "17:00:00".parse().unwrap();
        assert_eq!(t, TimeOfDay::from_hm(17, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "08", "24:00", "12:60", "12:00:30", "12:00:60", "ab:cd", "08:00:00:00"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_naive_time_round_trip() {
        let t: TimeOfDay = " 09:45 ".parse().unwrap();
        assert_eq!(t.to_naive_time(), NaiveTime::from_hms_opt(9, 45, 0).unwrap());
        assert_eq!(t.minutes_since_midnight(), 585);
        assert!(TimeOfDay::from_hm(24, 0).is_err());
    }

    #[test]
    fn test_hours_until_whole_hours() {
        let start = TimeOfDay::from_hm(8, 0).unwrap();
        let end = TimeOfDay::from_hm(11, 0).unwrap();
        assert_eq!(start.hours_until(end), 8..11);
        assert_eq!(start.minutes_until(end), 180);
    }

    #[test]
    fn test_hours_until_partial_hours() {
        let start = TimeOfDay::from_hm(8, 30).unwrap();
        let end = TimeOfDay::from_hm(10, 15).unwrap();
        assert_eq!(start.hours_until(end), 8..11);
        assert_eq!(start.minutes_until(end), 105);
    }

    #[test]
    fn test_hours_until_inverted_window_is_empty() {
        let start = TimeOfDay::from_hm(12, 0).unwrap();
        let end = TimeOfDay::from_hm(9, 0).unwrap();
        assert!(start.hours_until(end).is_empty());
        assert_eq!(start.minutes_until(end), 0);
    }

    #[test]
    fn test_day_of_week_bounds() {
        assert_eq!(DayOfWeek::new(4).unwrap(), DayOfWeek::FRIDAY);
        assert_eq!(DayOfWeek::new(5), Err(RosterError::DayOutOfRange(5)));
        assert_eq!(DayOfWeek::all().count(), 5);
        assert_eq!(DayOfWeek::WEDNESDAY.to_weekday(), Weekday::Wed);
    }

    #[test]
    fn test_serde_validates() {
        let day: DayOfWeek = serde_json::from_str("2").unwrap();
        assert_eq!(day, DayOfWeek::WEDNESDAY);
        assert!(serde_json::from_str::<DayOfWeek>("7").is_err());

        let t: TimeOfDay = serde_json::from_str("\"09:15\"").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"09:15\"");
        assert!(serde_json::from_str::<TimeOfDay>("\"9am\"").is_err());
    }
}
