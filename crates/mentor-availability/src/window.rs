//! Availability windows: request drafts, validated ranges, and persisted records.
//!
//! A window is a block of wall-clock time on one weekday (0 = Sunday .. 6 = Saturday)
//! during which a mentor accepts bookings. Every window satisfies `start < end` and
//! `end - start >= 30` minutes; [`validate_window`] is the only way to turn a
//! [`WindowDraft`] into a [`ValidatedWindow`].

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{AvailabilityError, Result};
use crate::time::TimeOfDay;

/// Shortest window a mentor may publish, in minutes.
pub const MIN_WINDOW_MINUTES: u16 = 30;

/// Identifier of a persisted availability window.
pub type WindowId = Ulid;

/// Day of week, 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: DayOfWeek = DayOfWeek(0);
    pub const MONDAY: DayOfWeek = DayOfWeek(1);
    pub const TUESDAY: DayOfWeek = DayOfWeek(2);
    pub const WEDNESDAY: DayOfWeek = DayOfWeek(3);
    pub const THURSDAY: DayOfWeek = DayOfWeek(4);
    pub const FRIDAY: DayOfWeek = DayOfWeek(5);
    pub const SATURDAY: DayOfWeek = DayOfWeek(6);

    /// # Errors
    /// Returns `AvailabilityError::Validation` if `value > 6`.
    pub fn new(value: u8) -> Result<Self> {
        if value > 6 {
            return Err(AvailabilityError::validation(format!(
                "day of week {} must be between 0 (Sunday) and 6 (Saturday)",
                value
            )));
        }
        Ok(DayOfWeek(value))
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        // num_days_from_sunday is always 0..=6.
        DayOfWeek(weekday.num_days_from_sunday() as u8)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_weekday(date.weekday())
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "Sunday",
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            _ => "Saturday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = AvailabilityError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

/// A half-open minute interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeRange {
    /// # Errors
    /// Returns `AvailabilityError::Validation` if `start >= end` or the range is
    /// shorter than [`MIN_WINDOW_MINUTES`].
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start >= end {
            return Err(AvailabilityError::validation(format!(
                "start time {} must be before end time {}",
                start, end
            )));
        }
        if end.minutes() - start.minutes() < MIN_WINDOW_MINUTES {
            return Err(AvailabilityError::validation(format!(
                "time slot {}-{} must be at least {} minutes",
                start, end, MIN_WINDOW_MINUTES
            )));
        }
        Ok(TimeRange { start, end })
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Start times of fixed-size steps from `start` while the step start is before `end`.
    ///
    /// The last step may run past `end`: 09:00-09:45 in 30-minute steps yields 09:00
    /// and 09:30.
    pub fn steps(&self, step_minutes: u16) -> impl Iterator<Item = TimeOfDay> {
        (self.start.minutes()..self.end.minutes())
            .step_by(usize::from(step_minutes.max(1)))
            .filter_map(|m| TimeOfDay::from_minutes(m).ok())
    }

    /// Two ranges overlap iff `a.start < b.end && a.end > b.start`.
    /// Touching ranges (one ends exactly where the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

fn default_recurring() -> bool {
    true
}

/// Request shape for creating a window. Times are raw strings until validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDraft {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_recurring")]
    pub is_recurring: bool,
}

impl WindowDraft {
    /// A recurring draft; the common case.
    pub fn new(day_of_week: u8, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            day_of_week,
            start_time: start_time.into(),
            end_time: end_time.into(),
            is_recurring: true,
        }
    }

    pub fn one_off(mut self) -> Self {
        self.is_recurring = false;
        self
    }
}

/// A draft that passed [`validate_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedWindow {
    pub day_of_week: DayOfWeek,
    pub range: TimeRange,
    pub is_recurring: bool,
}

impl ValidatedWindow {
    pub fn overlaps(&self, other: &ValidatedWindow) -> bool {
        self.day_of_week == other.day_of_week && self.range.overlaps(&other.range)
    }
}

/// Check a draft against the window invariants.
///
/// Converts both `HH:MM` strings to minutes-of-day, then requires `start < end`
/// and a length of at least [`MIN_WINDOW_MINUTES`].
///
/// # Errors
/// Returns `AvailabilityError::Validation` for an out-of-range day, a malformed
/// time string, `start >= end`, or a window shorter than 30 minutes.
pub fn validate_window(draft: &WindowDraft) -> Result<ValidatedWindow> {
    let day_of_week = DayOfWeek::new(draft.day_of_week)?;
    let start = TimeOfDay::parse(&draft.start_time)?;
    let end = TimeOfDay::parse(&draft.end_time)?;
    let range = TimeRange::new(start, end)?;

    Ok(ValidatedWindow {
        day_of_week,
        range,
        is_recurring: draft.is_recurring,
    })
}

/// A persisted availability window owned by one user.
///
/// Deserializing re-checks the range invariants, so a hand-edited or corrupt
/// record is rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredWindow")]
pub struct AvailabilityWindow {
    pub id: WindowId,
    pub user_id: String,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilityWindow {
    /// Attach a validated window to its owner with a fresh id.
    pub fn from_validated(user_id: &str, window: ValidatedWindow, now: DateTime<Utc>) -> Self {
        Self {
            id: Ulid::new(),
            user_id: user_id.to_string(),
            day_of_week: window.day_of_week,
            start_time: window.range.start(),
            end_time: window.range.end(),
            is_recurring: window.is_recurring,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stored range. Construction and deserialization both enforce
    /// `start < end`; the fields stay public, so callers that mutate them own
    /// that invariant.
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn as_validated(&self) -> ValidatedWindow {
        ValidatedWindow {
            day_of_week: self.day_of_week,
            range: self.range(),
            is_recurring: self.is_recurring,
        }
    }

    /// Sort key used by every listing: day of week, then start time.
    pub fn sort_key(&self) -> (DayOfWeek, TimeOfDay, TimeOfDay) {
        (self.day_of_week, self.start_time, self.end_time)
    }

    pub fn to_draft(&self) -> WindowDraft {
        WindowDraft {
            day_of_week: self.day_of_week.value(),
            start_time: self.start_time.to_string(),
            end_time: self.end_time.to_string(),
            is_recurring: self.is_recurring,
        }
    }
}

/// Wire shape of a persisted window before its range is checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWindow {
    id: WindowId,
    user_id: String,
    day_of_week: DayOfWeek,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
    is_recurring: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoredWindow> for AvailabilityWindow {
    type Error = AvailabilityError;

    fn try_from(raw: StoredWindow) -> Result<Self> {
        let range = TimeRange::new(raw.start_time, raw.end_time).map_err(|e| match e {
            AvailabilityError::Validation(msg) => {
                AvailabilityError::validation(format!("stored window {}: {}", raw.id, msg))
            }
            other => other,
        })?;
        Ok(Self {
            id: raw.id,
            user_id: raw.user_id,
            day_of_week: raw.day_of_week,
            start_time: range.start(),
            end_time: range.end(),
            is_recurring: raw.is_recurring,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

/// Partial update of a stored window. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
}

impl WindowPatch {
    pub fn is_empty(&self) -> bool {
        self.day_of_week.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.is_recurring.is_none()
    }

    /// Merge this patch over an existing window, producing a draft to re-validate.
    pub fn apply_to(&self, window: &AvailabilityWindow) -> WindowDraft {
        let base = window.to_draft();
        WindowDraft {
            day_of_week: self.day_of_week.unwrap_or(base.day_of_week),
            start_time: self.start_time.clone().unwrap_or(base.start_time),
            end_time: self.end_time.clone().unwrap_or(base.end_time),
            is_recurring: self.is_recurring.unwrap_or(base.is_recurring),
        }
    }
}
