//! # mentor-availability
//!
//! Recurring weekly availability for mentors, and the bookable 30-minute slots it
//! produces on a given date once booked sessions are taken out.
//!
//! A mentor publishes windows such as "Mondays 09:00-12:00". For a calendar date the
//! engine walks that weekday's recurring windows in 30-minute steps and keeps the
//! steps that are in the future and not inside a SCHEDULED or IN_PROGRESS session.
//! Storage, sessions and users live behind traits so any backend can be plugged in.
//!
//! ## Modules
//!
//! - [`time`] — `HH:MM` wall-clock times as minutes past midnight
//! - [`window`] — window drafts, validation, and persisted records
//! - [`overlap`] — same-day overlap detection within a batch
//! - [`session`] — booked sessions and the session query contract
//! - [`slots`] — slot computation for one date
//! - [`store`] — store/directory traits and an in-memory implementation
//! - [`engine`] — the engine facade tying it together
//! - [`error`] — Error types

pub mod clock;
pub mod engine;
pub mod error;
pub mod overlap;
pub mod session;
pub mod slots;
pub mod store;
pub mod time;
pub mod user;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{AvailabilityEngine, EngineConfig};
pub use error::{AvailabilityError, StoreError};
pub use overlap::{find_overlap, validate_no_overlap};
pub use session::{BookedSession, SessionQuery, SessionStatus};
pub use slots::{compute_slots, ComputedSlot, OccupiedSlotPolicy, SLOT_MINUTES};
pub use store::{InMemoryStore, SessionStore, Snapshot, UserDirectory, WindowStore};
pub use time::TimeOfDay;
pub use user::{UserRecord, UserRole};
pub use window::{
    validate_window, AvailabilityWindow, DayOfWeek, TimeRange, ValidatedWindow, WindowDraft,
    WindowId, WindowPatch,
};
