//! Error types for aggregation processes.

use thiserror::Error;

/// Errors raised by process validation and execution.
///
/// All of these are configuration or usage errors: they are reported before
/// any computation starts, the request fails as a whole, and nothing is
/// retried. Undefined numeric values never surface here — they travel as
/// NaN sentinels and are dropped from output.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// A required processing parameter was not supplied.
    #[error("process '{process}' is missing required parameter '{name}'")]
    MissingParameter {
        process: &'static str,
        name: &'static str,
    },

    /// A parameter was supplied but failed validation.
    #[error("process '{process}' has invalid parameter '{name}': {reason}")]
    InvalidParameter {
        process: &'static str,
        name: &'static str,
        reason: String,
    },

    /// A statistical function name did not resolve.
    #[error("unknown statistical function: {0}")]
    UnknownFunction(String),

    /// The prior stage handed this process data of the wrong shape.
    #[error("process '{process}' cannot consume this input: expected {expected}")]
    UnsupportedInput {
        process: &'static str,
        expected: &'static str,
    },
}

/// Result type for process operations.
pub type Result<T> = std::result::Result<T, ProcessError>;
