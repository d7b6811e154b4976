//! Error types for calbook operations.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Why the event builder rejected its input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEventKind {
    #[error("subject cannot be blank")]
    BlankSubject,

    #[error("start date-time is required")]
    MissingStart,

    #[error("end date-time is required for timed events")]
    MissingEnd,

    #[error("end must be strictly after start")]
    EndNotAfterStart,
}

/// Errors that can occur in calbook operations.
#[derive(Error, Debug)]
pub enum CalBookError {
    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] InvalidEventKind),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Event already exists: {0}")]
    DuplicateEvent(String),

    #[error("Calendar '{0}' already exists")]
    DuplicateCalendar(String),

    #[error("Calendar '{0}' not found")]
    CalendarNotFound(String),

    #[error("No event '{subject}' starting at {start}")]
    EventNotFound {
        subject: String,
        start: NaiveDateTime,
    },

    #[error("More than one event '{subject}' starts at {start}")]
    AmbiguousEvent {
        subject: String,
        start: NaiveDateTime,
    },

    #[error("No active calendar selected. Use 'use calendar' first")]
    NoActiveCalendar,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calbook operations.
pub type CalBookResult<T> = Result<T, CalBookError>;
