use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Authorization required")]
    Unauthenticated,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("No {0} found")]
    NotFound(&'static str),

    #[error("Already registered")]
    AlreadyRegistered,

    #[error("Not registered for this conference")]
    NotRegistered,

    #[error("No seats available")]
    NoCapacity,

    #[error("Seats available would exceed max attendees")]
    SeatOverflow,

    #[error("Stored record violates seat invariant: {0}")]
    CorruptRecord(String),

    #[error("Empty conference name")]
    EmptyName,

    #[error("Max attendees {0} is too large")]
    MaxAttendeesTooLarge(u32),

    #[error("End date is before start date")]
    InvalidDateRange,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Gave up after {attempts} conflicting attempts")]
    TransientConflict { attempts: u32 },

    #[error("Notification failed: {0}")]
    Notification(String),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found")]
    NotFound,

    #[error("Concurrent write conflict")]
    Conflict,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Caller-facing classification of every failure the service can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Unauthenticated,
    InvalidKey,
    InvalidArgument,
    NotFound,
    AlreadyRegistered,
    NotRegistered,
    NoCapacity,
    TransientConflict,
    Unknown,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            DomainError::Repository(RepositoryError::Conflict) => ErrorKind::TransientConflict,
            DomainError::Repository(RepositoryError::DatabaseError(_)) => ErrorKind::Unknown,
            DomainError::Unauthenticated => ErrorKind::Unauthenticated,
            DomainError::InvalidKey(_) => ErrorKind::InvalidKey,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::AlreadyRegistered => ErrorKind::AlreadyRegistered,
            DomainError::NotRegistered => ErrorKind::NotRegistered,
            DomainError::NoCapacity => ErrorKind::NoCapacity,
            DomainError::EmptyName
            | DomainError::MaxAttendeesTooLarge(_)
            | DomainError::InvalidDateRange
            | DomainError::InvalidQuery(_) => {
                ErrorKind::InvalidArgument
            }
            DomainError::TransientConflict { .. } => ErrorKind::TransientConflict,
            DomainError::SeatOverflow
            | DomainError::CorruptRecord(_)
            | DomainError::Notification(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the failed unit of work may simply be run again.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Repository(RepositoryError::Conflict))
    }
}
