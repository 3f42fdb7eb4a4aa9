//! Error types shared by the engine's value types.

use thiserror::Error;

/// Errors produced while parsing or validating geometry and temporal values.
#[derive(Debug, Error, PartialEq)]
pub enum CommonError {
    /// Invalid WKT geometry text.
    #[error("invalid WKT geometry: {0}")]
    InvalidWkt(String),

    /// A coordinate token could not be parsed as a number.
    #[error("invalid coordinate value: {0}")]
    InvalidCoordinate(String),

    /// A coordinate is outside the valid geographic range.
    #[error("coordinate out of range: {0}")]
    OutOfRange(String),

    /// A timestamp literal did not match the interval's granularity.
    #[error("failed to parse timestamp '{value}': expected {expected}")]
    TimeParse {
        value: String,
        expected: &'static str,
    },

    /// A duration literal could not be parsed.
    #[error("failed to parse duration '{0}': expected ISO 8601 (e.g. P1D, PT6H)")]
    DurationParse(String),

    /// Interval bounds or step violate the interval invariants.
    #[error("invalid temporal interval: {0}")]
    InvalidInterval(String),
}

/// Result type for obs-common operations.
pub type Result<T> = std::result::Result<T, CommonError>;
