//! Detect overlapping windows within one submitted batch.
//!
//! Performs pairwise comparison restricted to windows on the same day of week.
//! Touching windows (one ends exactly when another starts) are NOT overlaps.

use crate::error::{AvailabilityError, Result};
use crate::window::ValidatedWindow;

/// Return the first overlapping same-day pair, as submission indices `(i, j)` with `i < j`.
///
/// Pairs are visited in order `(0, 1), (0, 2), .., (1, 2), ..`, so the result is the
/// earliest pair by first index, then by second.
pub fn find_overlap(windows: &[ValidatedWindow]) -> Option<(usize, usize)> {
    for (i, a) in windows.iter().enumerate() {
        for (j, b) in windows.iter().enumerate().skip(i + 1) {
            if a.overlaps(b) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Fail if any two windows in the batch overlap on the same day.
///
/// # Errors
/// Returns `AvailabilityError::Validation` naming the first overlapping pair.
pub fn validate_no_overlap(windows: &[ValidatedWindow]) -> Result<()> {
    match find_overlap(windows) {
        Some((i, j)) => {
            let (a, b) = (&windows[i], &windows[j]);
            Err(AvailabilityError::validation(format!(
                "time slots cannot overlap: {} {} and {} {}",
                a.day_of_week, a.range, b.day_of_week, b.range
            )))
        }
        None => Ok(()),
    }
}

/// Fail if `candidate` overlaps any of `existing`.
///
/// Used for the opt-in check of a single new window against the owner's stored windows.
///
/// # Errors
/// Returns `AvailabilityError::Validation` naming the first stored window hit.
pub fn validate_against(candidate: &ValidatedWindow, existing: &[ValidatedWindow]) -> Result<()> {
    match existing.iter().find(|w| candidate.overlaps(w)) {
        Some(hit) => Err(AvailabilityError::validation(format!(
            "time slot {} {} overlaps existing slot {} {}",
            candidate.day_of_week, candidate.range, hit.day_of_week, hit.range
        ))),
        None => Ok(()),
    }
}
