//! Bookable slot computation for one mentor on one calendar date.
//!
//! Each window is walked in fixed 30-minute steps. A step becomes a slot when it is
//! strictly in the future and no blocking session's half-open interval
//! `[scheduled_at, scheduled_at + duration)` contains it.
//!
//! Windows are consumed in the order given and the output is not re-sorted; callers
//! pass windows ordered by start time to get chronological output.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::BookedSession;
use crate::time::TimeOfDay;
use crate::window::AvailabilityWindow;

/// Step between consecutive slot start times, in minutes.
pub const SLOT_MINUTES: u16 = 30;

/// What to do with a future slot that a booked session occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupiedSlotPolicy {
    /// Leave occupied slots out of the result entirely.
    #[default]
    Drop,
    /// Emit occupied slots with `available: false`.
    Flag,
}

/// One 30-minute granule of a mentor's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedSlot {
    pub time: TimeOfDay,
    pub available: bool,
}

/// Inclusive instant bounds of a calendar date: `00:00:00.000` to `23:59:59.999` UTC.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// The instant at `time` on `date`.
pub fn slot_instant(date: NaiveDate, time: TimeOfDay) -> DateTime<Utc> {
    NaiveDateTime::new(date, time.to_naive_time()).and_utc()
}

/// Compute the slots for `date` from that day's windows and booked sessions.
///
/// Slots at or before `now` are always omitted. Occupied slots are dropped or
/// flagged according to `policy`. Sessions whose status does not block
/// availability are ignored.
pub fn compute_slots(
    windows: &[AvailabilityWindow],
    sessions: &[BookedSession],
    date: NaiveDate,
    now: DateTime<Utc>,
    policy: OccupiedSlotPolicy,
) -> Vec<ComputedSlot> {
    let blocking: Vec<&BookedSession> = sessions
        .iter()
        .filter(|s| s.status.blocks_availability())
        .collect();

    let mut slots = Vec::new();

    for window in windows {
        for time in window.range().steps(SLOT_MINUTES) {
            let candidate = slot_instant(date, time);
            if candidate <= now {
                continue;
            }

            let occupied = blocking.iter().any(|s| s.occupies(candidate));
            match (occupied, policy) {
                (false, _) => slots.push(ComputedSlot {
                    time,
                    available: true,
                }),
                (true, OccupiedSlotPolicy::Flag) => slots.push(ComputedSlot {
                    time,
                    available: false,
                }),
                (true, OccupiedSlotPolicy::Drop) => {}
            }
        }
    }

    slots
}
