//! Error types for the observation store.

use thiserror::Error;

/// Errors that can occur while ingesting into or querying the store.
///
/// Undefined numeric results are NOT errors: interpolation outside the
/// interpolator's domain yields a NaN sentinel that callers check and drop.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Ingestion exceeded the capacity declared by the producer.
    #[error("store capacity {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    /// A grid dimension was explicitly given as zero.
    #[error("invalid grid dimensions: {0}")]
    InvalidGrid(String),

    /// A variable id was passed that was never assigned in the store.
    #[error("unknown variable id {0}")]
    UnknownVariable(u32),

    /// A geometry or temporal value failed to parse or validate.
    #[error(transparent)]
    Common(#[from] obs_common::CommonError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
