//! Error types for board domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing board domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The lane key is not a non-empty slug.
    #[error("invalid lane key '{0}', expected lowercase letters, digits and dashes")]
    InvalidLaneKey(String),

    /// The lane name is empty after trimming.
    #[error("lane name must not be empty")]
    EmptyLaneName,

    /// The lane color is not a hex color.
    #[error("invalid lane color '{0}', expected #rgb or #rrggbb")]
    InvalidLaneColor(String),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// A text field exceeds its persisted width.
    #[error("{field} exceeds {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },

    /// The local task identifier is out of range.
    #[error("invalid local task id {0}, expected a positive integer")]
    InvalidLocalId(u64),

    /// A position is NaN or infinite.
    #[error("order must be a finite number")]
    NonFiniteOrder,
}

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
