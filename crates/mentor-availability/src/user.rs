//! User identity as seen through the user directory.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Mentor,
    Mentee,
}

impl UserRole {
    /// Mentors and admins publish availability and can be booked.
    pub fn can_host_sessions(self) -> bool {
        matches!(self, UserRole::Mentor | UserRole::Admin)
    }
}

/// The `findUser` result: just enough to check a mentor id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub role: UserRole,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}
