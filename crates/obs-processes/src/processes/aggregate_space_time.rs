//! Collapse both the location and the time axis.

use obs_store::{AreaObservation, ObservationCollection};

use crate::error::{ProcessError, Result};
use crate::params::{aggregate_key, ProcessParameters};
use crate::processes::{Process, ProcessData};

/// Collect every value of every location's time series per variable and
/// reduce with each configured function, collapsing the whole request into
/// one area observation.
pub struct AggregateSpaceTime;

const ID: &str = "aggregate-space-time";

impl Process for AggregateSpaceTime {
    fn id(&self) -> &'static str {
        ID
    }

    fn execute(&self, input: ProcessData, params: &ProcessParameters) -> Result<ProcessData> {
        let area = params.require_area(ID)?;
        let functions = params.require_functions(ID)?;
        let collections = input.into_collections(ID)?;

        let mut by_variable: std::collections::BTreeMap<&String, Vec<f64>> = Default::default();
        for collection in &collections {
            match collection {
                ObservationCollection::PointSeries(series) => {
                    if !area.contains_point(series.point.lon, series.point.lat) {
                        continue;
                    }
                    for (variable, times) in &series.series {
                        by_variable
                            .entry(variable)
                            .or_default()
                            .extend(times.values().copied());
                    }
                }
                _ => {
                    return Err(ProcessError::UnsupportedInput {
                        process: ID,
                        expected: "point time-series collections",
                    })
                }
            }
        }

        let mut out = AreaObservation::new(area.clone());
        for (variable, samples) in by_variable {
            for &function in functions {
                let reduced = function.reduce(&samples);
                if !reduced.is_nan() {
                    out.set_value(aggregate_key(variable, function), reduced);
                }
            }
        }

        Ok(ProcessData::Collections(vec![ObservationCollection::Area(
            out,
        )]))
    }
}
