//! Statistical aggregation over observation collections and grids.
//!
//! This crate layers aggregation on top of the observation store's outputs:
//! a set of pluggable [`StatisticalFunction`] reducers, a parameter bag with
//! validate-before-execute semantics, and four [`processes::Process`]
//! implementations that collapse the time axis, the location axis, both, or
//! a grid's step axis. Processes compose into a linear
//! [`processes::Pipeline`]:
//!
//! ```ignore
//! use obs_processes::{AggregateSpace, AggregateTime, Pipeline, ProcessData, ProcessParameters};
//!
//! let pipeline = Pipeline::new().then(AggregateSpace).then(AggregateTime);
//! let output = pipeline.execute(ProcessData::Collections(series), &params)?;
//! ```

pub mod error;
pub mod params;
pub mod processes;
pub mod statistics;

// Re-export commonly used types at crate root
pub use error::{ProcessError, Result};
pub use params::{aggregate_key, ProcessParameters};
pub use processes::{
    AggregateGridTime, AggregateSpace, AggregateSpaceTime, AggregateTime, Pipeline, Process,
    ProcessData,
};
pub use statistics::StatisticalFunction;
