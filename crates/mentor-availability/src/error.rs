//! Error types for availability operations.

use thiserror::Error;

/// Failure raised by a persistence backend.
///
/// The engine never inspects or masks these; they travel to the caller inside
/// [`AvailabilityError::Store`] unchanged.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// Bad input: malformed time, start >= end, window too short, overlapping batch.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The window is not owned by the caller, or the user is not a mentor.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AvailabilityError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
