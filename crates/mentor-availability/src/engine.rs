//! The availability engine: window management and slot queries over injected stores.
//!
//! [`AvailabilityEngine`] holds no state of its own beyond its configuration. Each call
//! reads from and writes to the store it was built with, so concurrent callers do not
//! interact inside the engine. The engine does not log; that belongs to the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{AvailabilityError, Result};
use crate::overlap::{validate_against, validate_no_overlap};
use crate::session::SessionQuery;
use crate::slots::{compute_slots, day_bounds, ComputedSlot, OccupiedSlotPolicy};
use crate::store::{SessionStore, UserDirectory, WindowStore};
use crate::window::{
    validate_window, AvailabilityWindow, DayOfWeek, ValidatedWindow, WindowDraft, WindowId,
    WindowPatch,
};

/// Tunables for [`AvailabilityEngine`]. The default matches the established behavior:
/// occupied slots are dropped and single-window writes are not checked against
/// stored windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub occupied_slots: OccupiedSlotPolicy,
    /// Reject a created or updated window that overlaps one of the owner's stored windows.
    pub check_stored_overlaps: bool,
}

pub struct AvailabilityEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    config: EngineConfig,
}

impl<S> AvailabilityEngine<S, SystemClock>
where
    S: WindowStore + SessionStore + UserDirectory,
{
    /// Engine on the wall clock with default configuration.
    pub fn with_system_clock(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S, C> AvailabilityEngine<S, C>
where
    S: WindowStore + SessionStore + UserDirectory,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate one window and persist it for `owner`.
    ///
    /// # Errors
    /// `Validation` if the draft is invalid (or, with `check_stored_overlaps`, overlaps a
    /// stored window); `Store` on persistence failure.
    pub fn create_window(&self, owner: &str, draft: &WindowDraft) -> Result<AvailabilityWindow> {
        let validated = validate_window(draft)?;
        if self.config.check_stored_overlaps {
            let existing = self.stored_windows(owner, None)?;
            validate_against(&validated, &existing)?;
        }

        let window = AvailabilityWindow::from_validated(owner, validated, self.clock.now());
        Ok(self.store.insert_window(window)?)
    }

    /// Replace all of `owner`'s windows with `drafts`.
    ///
    /// Every draft is validated and the batch is checked for same-day overlaps before
    /// the store is touched; on any failure nothing changes. The delete and insert run
    /// as one store transaction.
    ///
    /// # Errors
    /// `Validation` for an empty batch, an invalid draft, or an overlapping pair;
    /// `Store` on persistence failure.
    pub fn replace_all_windows(
        &self,
        owner: &str,
        drafts: &[WindowDraft],
    ) -> Result<Vec<AvailabilityWindow>> {
        if drafts.is_empty() {
            return Err(AvailabilityError::validation(
                "at least one time slot is required",
            ));
        }

        let validated = drafts
            .iter()
            .map(validate_window)
            .collect::<Result<Vec<_>>>()?;
        validate_no_overlap(&validated)?;

        let now = self.clock.now();
        let windows = validated
            .into_iter()
            .map(|v| AvailabilityWindow::from_validated(owner, v, now))
            .collect();

        Ok(self.store.replace_all_windows(owner, windows)?)
    }

    /// All of `owner`'s windows, ordered by (day of week, start time).
    pub fn list_windows(&self, owner: &str) -> Result<Vec<AvailabilityWindow>> {
        Ok(self.store.list_windows(owner)?)
    }

    /// A mentor's published windows, as shown to mentees.
    ///
    /// # Errors
    /// `NotFound` unless `mentor_id` belongs to a mentor or admin.
    pub fn list_mentor_windows(&self, mentor_id: &str) -> Result<Vec<AvailabilityWindow>> {
        self.require_mentor(mentor_id)?;
        self.list_windows(mentor_id)
    }

    /// Apply a partial update to one of `owner`'s windows and re-validate the result.
    ///
    /// # Errors
    /// `NotFound` if no window with `id` belongs to `owner`; `Validation` if the merged
    /// window is invalid.
    pub fn update_window(
        &self,
        id: WindowId,
        owner: &str,
        patch: &WindowPatch,
    ) -> Result<AvailabilityWindow> {
        let existing = self
            .store
            .get_window(id, owner)?
            .ok_or_else(|| window_not_found(id))?;

        let validated = validate_window(&patch.apply_to(&existing))?;
        if self.config.check_stored_overlaps {
            let others = self.stored_windows(owner, Some(id))?;
            validate_against(&validated, &others)?;
        }

        let updated = AvailabilityWindow {
            day_of_week: validated.day_of_week,
            start_time: validated.range.start(),
            end_time: validated.range.end(),
            is_recurring: validated.is_recurring,
            updated_at: self.clock.now(),
            ..existing
        };

        if !self.store.update_window(&updated)? {
            return Err(window_not_found(id));
        }
        Ok(updated)
    }

    /// Delete one window, scoped to its owner.
    ///
    /// # Errors
    /// `NotFound` if no window with `id` belongs to `owner`, even when the id exists
    /// under another owner.
    pub fn delete_window(&self, id: WindowId, owner: &str) -> Result<()> {
        if self.store.delete_window(id, owner)? {
            Ok(())
        } else {
            Err(window_not_found(id))
        }
    }

    /// Delete every window `owner` has. Zero matches is not an error.
    pub fn delete_all_windows(&self, owner: &str) -> Result<usize> {
        Ok(self.store.delete_all_windows(owner)?)
    }

    /// Bookable slots for `mentor_id` on `date`.
    ///
    /// Uses the mentor's recurring windows for the date's weekday (in start-time order)
    /// and the SCHEDULED/IN_PROGRESS sessions that start within the date. No windows
    /// yields an empty list.
    ///
    /// # Errors
    /// `NotFound` unless `mentor_id` belongs to a mentor or admin; `Store` on
    /// persistence failure.
    pub fn compute_available_slots(
        &self,
        mentor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ComputedSlot>> {
        self.require_mentor(mentor_id)?;

        let day = DayOfWeek::from_date(date);
        let windows = self.store.find_windows(mentor_id, day, true)?;
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        let (from, to) = day_bounds(date);
        let sessions = self
            .store
            .find_sessions(&SessionQuery::blocking(mentor_id, from, to))?;

        Ok(compute_slots(
            &windows,
            &sessions,
            date,
            self.clock.now(),
            self.config.occupied_slots,
        ))
    }

    fn require_mentor(&self, user_id: &str) -> Result<()> {
        match self.store.find_user(user_id)? {
            Some(user) if user.role.can_host_sessions() => Ok(()),
            _ => Err(AvailabilityError::not_found(format!(
                "mentor {} not found",
                user_id
            ))),
        }
    }

    fn stored_windows(&self, owner: &str, skip: Option<WindowId>) -> Result<Vec<ValidatedWindow>> {
        Ok(self
            .store
            .list_windows(owner)?
            .iter()
            .filter(|w| Some(w.id) != skip)
            .map(AvailabilityWindow::as_validated)
            .collect())
    }
}

fn window_not_found(id: WindowId) -> AvailabilityError {
    AvailabilityError::not_found(format!("availability slot {} not found", id))
}
