//! Persistence capabilities consumed by the engine, and an in-memory implementation.
//!
//! The engine never reaches for a global client: every backend it talks to is passed
//! in through these traits. [`InMemoryStore`] implements all three behind one lock and
//! is what the CLI and the tests run against.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::session::{BookedSession, SessionQuery};
use crate::user::UserRecord;
use crate::window::{AvailabilityWindow, DayOfWeek, WindowId};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage for availability windows.
///
/// Every mutating method is scoped by owner: a window id alone never authorizes a change.
pub trait WindowStore {
    fn insert_window(&self, window: AvailabilityWindow) -> StoreResult<AvailabilityWindow>;

    /// All windows owned by `owner`, ordered by (day of week, start time).
    fn list_windows(&self, owner: &str) -> StoreResult<Vec<AvailabilityWindow>>;

    /// Windows owned by `owner` on `day`, ordered by start time.
    /// With `recurring_only`, one-off windows are left out.
    fn find_windows(
        &self,
        owner: &str,
        day: DayOfWeek,
        recurring_only: bool,
    ) -> StoreResult<Vec<AvailabilityWindow>>;

    fn get_window(&self, id: WindowId, owner: &str) -> StoreResult<Option<AvailabilityWindow>>;

    /// Overwrite the stored window with the same id and owner. Returns false if absent.
    fn update_window(&self, window: &AvailabilityWindow) -> StoreResult<bool>;

    /// Delete where `id = ? AND owner = ?`. Returns false if nothing matched.
    fn delete_window(&self, id: WindowId, owner: &str) -> StoreResult<bool>;

    /// Delete every window owned by `owner`. Returns the number removed.
    fn delete_all_windows(&self, owner: &str) -> StoreResult<usize>;

    /// Delete all of `owner`'s windows and insert `windows`, as one transaction.
    /// Returns the owner's resulting windows ordered by (day of week, start time).
    fn replace_all_windows(
        &self,
        owner: &str,
        windows: Vec<AvailabilityWindow>,
    ) -> StoreResult<Vec<AvailabilityWindow>>;
}

/// Read access to booked sessions.
pub trait SessionStore {
    fn find_sessions(&self, query: &SessionQuery) -> StoreResult<Vec<BookedSession>>;
}

/// Read access to user identities.
pub trait UserDirectory {
    fn find_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>>;
}

/// Serializable contents of an [`InMemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub windows: Vec<AvailabilityWindow>,
    #[serde(default)]
    pub sessions: Vec<BookedSession>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, UserRecord>,
    windows: Vec<AvailabilityWindow>,
    sessions: Vec<BookedSession>,
}

/// Thread-safe in-memory store for windows, sessions, and users.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

fn sorted(mut windows: Vec<AvailabilityWindow>) -> Vec<AvailabilityWindow> {
    windows.sort_by_key(|w| w.sort_key());
    windows
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let state = State {
            users: snapshot
                .users
                .into_iter()
                .map(|u| (u.id.clone(), u))
                .collect(),
            windows: snapshot.windows,
            sessions: snapshot.sessions,
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copy the current contents out. Users are ordered by id for stable output.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        let state = self.read()?;
        let mut users: Vec<UserRecord> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Snapshot {
            users,
            windows: state.windows.clone(),
            sessions: state.sessions.clone(),
        })
    }

    pub fn add_user(&self, user: UserRecord) -> StoreResult<()> {
        self.write()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn add_session(&self, session: BookedSession) -> StoreResult<()> {
        self.write()?.sessions.push(session);
        Ok(())
    }

    pub fn window_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.windows.len())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

impl WindowStore for InMemoryStore {
    fn insert_window(&self, window: AvailabilityWindow) -> StoreResult<AvailabilityWindow> {
        self.write()?.windows.push(window.clone());
        Ok(window)
    }

    fn list_windows(&self, owner: &str) -> StoreResult<Vec<AvailabilityWindow>> {
        let state = self.read()?;
        let owned = state
            .windows
            .iter()
            .filter(|w| w.user_id == owner)
            .cloned()
            .collect();
        Ok(sorted(owned))
    }

    fn find_windows(
        &self,
        owner: &str,
        day: DayOfWeek,
        recurring_only: bool,
    ) -> StoreResult<Vec<AvailabilityWindow>> {
        let state = self.read()?;
        let matching = state
            .windows
            .iter()
            .filter(|w| w.user_id == owner && w.day_of_week == day)
            .filter(|w| !recurring_only || w.is_recurring)
            .cloned()
            .collect();
        Ok(sorted(matching))
    }

    fn get_window(&self, id: WindowId, owner: &str) -> StoreResult<Option<AvailabilityWindow>> {
        let state = self.read()?;
        Ok(state
            .windows
            .iter()
            .find(|w| w.id == id && w.user_id == owner)
            .cloned())
    }

    fn update_window(&self, window: &AvailabilityWindow) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state
            .windows
            .iter_mut()
            .find(|w| w.id == window.id && w.user_id == window.user_id)
        {
            Some(slot) => {
                *slot = window.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_window(&self, id: WindowId, owner: &str) -> StoreResult<bool> {
        let mut state = self.write()?;
        let before = state.windows.len();
        state.windows.retain(|w| !(w.id == id && w.user_id == owner));
        Ok(state.windows.len() < before)
    }

    fn delete_all_windows(&self, owner: &str) -> StoreResult<usize> {
        let mut state = self.write()?;
        let before = state.windows.len();
        state.windows.retain(|w| w.user_id != owner);
        Ok(before - state.windows.len())
    }

    fn replace_all_windows(
        &self,
        owner: &str,
        windows: Vec<AvailabilityWindow>,
    ) -> StoreResult<Vec<AvailabilityWindow>> {
        // One write guard spans the delete and the insert.
        let mut state = self.write()?;
        state.windows.retain(|w| w.user_id != owner);
        state.windows.extend(windows);
        let owned = state
            .windows
            .iter()
            .filter(|w| w.user_id == owner)
            .cloned()
            .collect();
        Ok(sorted(owned))
    }
}

impl SessionStore for InMemoryStore {
    fn find_sessions(&self, query: &SessionQuery) -> StoreResult<Vec<BookedSession>> {
        let state = self.read()?;
        let mut found: Vec<BookedSession> = state
            .sessions
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();
        found.sort_by_key(|s| s.scheduled_at);
        Ok(found)
    }
}

impl UserDirectory for InMemoryStore {
    fn find_user(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.read()?.users.get(user_id).cloned())
    }
}
