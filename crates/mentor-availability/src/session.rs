//! Booked mentorship sessions, as read from the session store.
//!
//! Sessions are owned by an external scheduling service; this crate only reads them
//! to decide which slots are occupied.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    /// Statuses that hold on to the mentor's time.
    pub const BLOCKING: [SessionStatus; 2] = [SessionStatus::Scheduled, SessionStatus::InProgress];

    pub fn blocks_availability(self) -> bool {
        Self::BLOCKING.contains(&self)
    }
}

/// A scheduled meeting between a mentor and a mentee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSession {
    pub id: String,
    pub mentor_id: String,
    pub scheduled_at: DateTime<Utc>,
    /// Length of the session in minutes.
    pub duration: u32,
    pub status: SessionStatus,
}

impl BookedSession {
    pub fn end(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(i64::from(self.duration))
    }

    /// Half-open containment: `scheduled_at <= instant < end`.
    pub fn occupies(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.scheduled_at && instant < self.end()
    }
}

/// The `findSessions` contract: a mentor, an inclusive instant range, and a status filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub mentor_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub statuses: Vec<SessionStatus>,
}

impl SessionQuery {
    /// Sessions that block availability for `mentor_id` within `[from, to]`.
    pub fn blocking(mentor_id: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            mentor_id: mentor_id.to_string(),
            from,
            to,
            statuses: SessionStatus::BLOCKING.to_vec(),
        }
    }

    pub fn matches(&self, session: &BookedSession) -> bool {
        session.mentor_id == self.mentor_id
            && session.scheduled_at >= self.from
            && session.scheduled_at <= self.to
            && self.statuses.contains(&session.status)
    }
}
