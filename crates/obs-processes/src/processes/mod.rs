//! Aggregation processes.
//!
//! Every process is a pure transform `execute(data, params) -> data'` over
//! the sum type [`ProcessData`], so processes chain into a linear
//! [`Pipeline`]. Validation happens before computation: a process that is
//! missing a parameter or receives data of the wrong shape fails the whole
//! request immediately, with no partial output.

mod aggregate_grid_time;
mod aggregate_space;
mod aggregate_space_time;
mod aggregate_time;

pub use aggregate_grid_time::AggregateGridTime;
pub use aggregate_space::AggregateSpace;
pub use aggregate_space_time::AggregateSpaceTime;
pub use aggregate_time::AggregateTime;

use tracing::debug;

use obs_store::{DataArrayXy, DataArrayXyt, ObservationCollection};

use crate::error::{ProcessError, Result};
use crate::params::ProcessParameters;

/// The data shapes that flow between pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessData {
    /// Interpolated or aggregated observation collections.
    Collections(Vec<ObservationCollection>),
    /// A 2-D grid, typically the result of collapsing a time axis.
    GridXy(DataArrayXy),
    /// A 3-D space-time grid from the resampler.
    GridXyt(DataArrayXyt),
}

impl ProcessData {
    /// Short shape label for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Collections(_) => "collections",
            Self::GridXy(_) => "grid-xy",
            Self::GridXyt(_) => "grid-xyt",
        }
    }

    /// The collections payload, or an unsupported-input failure.
    pub(crate) fn into_collections(
        self,
        process: &'static str,
    ) -> Result<Vec<ObservationCollection>> {
        match self {
            Self::Collections(collections) => Ok(collections),
            _ => Err(ProcessError::UnsupportedInput {
                process,
                expected: "observation collections",
            }),
        }
    }

    /// The space-time grid payload, or an unsupported-input failure.
    pub(crate) fn into_grid_xyt(self, process: &'static str) -> Result<DataArrayXyt> {
        match self {
            Self::GridXyt(grid) => Ok(grid),
            _ => Err(ProcessError::UnsupportedInput {
                process,
                expected: "a space-time grid",
            }),
        }
    }
}

/// A pure aggregation stage.
pub trait Process: Send + Sync {
    /// Stable process identifier (e.g. `aggregate-time`).
    fn id(&self) -> &'static str;

    /// Validate parameters and input shape, then transform the data.
    fn execute(&self, input: ProcessData, params: &ProcessParameters) -> Result<ProcessData>;
}

/// A linear chain of processes.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Process>>,
}

impl Pipeline {
    /// An empty pipeline; executes as the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn then(mut self, stage: impl Process + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when no stage was added.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the stages in order, threading each output into the next input.
    pub fn execute(&self, input: ProcessData, params: &ProcessParameters) -> Result<ProcessData> {
        let mut data = input;
        for stage in &self.stages {
            debug!(process = stage.id(), input = data.kind(), "executing process");
            data = stage.execute(data, params)?;
        }
        Ok(data)
    }
}
