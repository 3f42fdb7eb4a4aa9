//! Processing parameters and their validation.

use serde::{Deserialize, Serialize};

use obs_common::{MultiPolygon, Point, TemporalInterval};

use crate::error::{ProcessError, Result};
use crate::statistics::StatisticalFunction;

/// The parameter bag handed to every process in a request.
///
/// Each process validates the subset it requires up front and fails the
/// request before touching any data; a missing or empty parameter is never
/// silently defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessParameters {
    /// Query area for spatial aggregation output geometry and filtering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<MultiPolygon>,

    /// Query point, for processes downstream of a position query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,

    /// Time interval defining the output time axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<TemporalInterval>,

    /// Statistical functions to apply, in request order.
    #[serde(default)]
    pub functions: Vec<StatisticalFunction>,
}

impl ProcessParameters {
    /// Parameters carrying only a function list.
    pub fn with_functions(functions: Vec<StatisticalFunction>) -> Self {
        Self {
            functions,
            ..Self::default()
        }
    }

    /// The area parameter, or a structured failure naming the process.
    pub fn require_area(&self, process: &'static str) -> Result<&MultiPolygon> {
        self.area.as_ref().ok_or(ProcessError::MissingParameter {
            process,
            name: "area",
        })
    }

    /// The interval parameter, or a structured failure naming the process.
    pub fn require_interval(&self, process: &'static str) -> Result<&TemporalInterval> {
        self.interval
            .as_ref()
            .ok_or(ProcessError::MissingParameter {
                process,
                name: "interval",
            })
    }

    /// The non-empty function list, or a structured failure.
    pub fn require_functions(&self, process: &'static str) -> Result<&[StatisticalFunction]> {
        if self.functions.is_empty() {
            return Err(ProcessError::MissingParameter {
                process,
                name: "functions",
            });
        }
        Ok(&self.functions)
    }
}

/// The `{variable}_{function}` key of an aggregated value.
pub fn aggregate_key(variable: &str, function: StatisticalFunction) -> String {
    format!("{variable}_{function}")
}
