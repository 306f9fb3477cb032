//! Wall-clock time of day, stored as minutes past midnight.
//!
//! Availability windows carry local `HH:MM` values with no timezone component.
//! Parsing follows the 24-hour pattern `^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$`, so a
//! single-digit hour (`9:00`) is accepted but rendering always zero-pads (`09:00`).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// Number of minutes in a day. Valid minute-of-day values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Parse an `HH:MM` (or `H:MM`) string.
    ///
    /// # Errors
    /// Returns `AvailabilityError::Validation` if the string does not match the
    /// 24-hour pattern.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || {
            AvailabilityError::validation(format!("time '{}' must be in HH:MM format", s))
        };

        let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;

        if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if minutes.len() != 2 || !minutes.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let h: u16 = hours.parse().map_err(|_| invalid())?;
        let m: u16 = minutes.parse().map_err(|_| invalid())?;
        if h > 23 || m > 59 {
            return Err(invalid());
        }

        Ok(TimeOfDay(h * 60 + m))
    }

    /// Build from a minute-of-day offset.
    ///
    /// # Errors
    /// Returns `AvailabilityError::Validation` if `minutes` is not below 1440.
    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(AvailabilityError::validation(format!(
                "minute-of-day {} is out of range 0..{}",
                minutes, MINUTES_PER_DAY
            )));
        }
        Ok(TimeOfDay(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Convert to a `chrono::NaiveTime` at second zero.
    pub fn to_naive_time(self) -> NaiveTime {
        // Both components are range-checked on construction.
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = AvailabilityError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}
