//! Wall-clock time of day in `HH:MM` form.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Error returned when a string is not a valid `HH:MM` clock time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid clock time {0:?}: expected HH:MM")]
pub struct InvalidClockTime(pub String);

/// A time of day with minute precision.
///
/// Serialized as `"HH:MM"`. Arithmetic wraps at midnight; callers that care
/// about the day boundary use [`ClockTime::add_hours`], which reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Creates a clock time, returning `None` when out of range.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| ClockTime {
            minutes: hour as u16 * 60 + minute as u16,
        })
    }

    /// Const constructor for fixed times; panics at compile time when out of range.
    pub const fn hm(hour: u8, minute: u8) -> Self {
        assert!(hour < 24 && minute < 60, "clock time out of range");
        ClockTime {
            minutes: hour as u16 * 60 + minute as u16,
        }
    }

    pub fn hour(&self) -> u8 {
        (self.minutes / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.minutes % 60) as u8
    }

    /// Adds whole hours, wrapping past midnight.
    ///
    /// Returns the new time and whether it crossed into the next day.
    pub fn add_hours(self, hours: u16) -> (ClockTime, bool) {
        let total = self.minutes as u32 + hours as u32 * 60;
        let wrapped = total >= MINUTES_PER_DAY as u32;
        let minutes = (total % MINUTES_PER_DAY as u32) as u16;
        (ClockTime { minutes }, wrapped)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour() as u32, self.minute() as u32, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for ClockTime {
    type Err = InvalidClockTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidClockTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        ClockTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = InvalidClockTime;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}
