//! Error types for inspection domain validation and parsing.

use chrono::NaiveTime;
use thiserror::Error;

/// Errors returned while constructing domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InspectionDomainError {
    /// The schedule frequency must be a positive number of minutes.
    #[error("schedule frequency must be positive, got {0} minutes")]
    InvalidFrequency(u32),

    /// The daily active window is inverted.
    #[error("daily window start {start} is after end {end}")]
    InvalidDailyWindow {
        /// Configured start of day.
        start: NaiveTime,
        /// Configured end of day.
        end: NaiveTime,
    },

    /// A weekday number outside 1 (Monday) .. 7 (Sunday).
    #[error("invalid weekday number {0}, expected 1 (Monday) through 7 (Sunday)")]
    InvalidWeekday(u8),

    /// A schedule with no active weekdays would never produce a task.
    #[error("weekday set must not be empty")]
    EmptyWeekdaySet,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing compliance statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown compliance status: {0}")]
pub struct ParseComplianceStatusError(pub String);

/// Error returned while parsing review statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown review status: {0}")]
pub struct ParseReviewStatusError(pub String);
