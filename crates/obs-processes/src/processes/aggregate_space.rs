//! Collapse the location axis, keeping the time axis.

use std::collections::BTreeMap;

use obs_store::{AreaSeriesObservation, ObservationCollection};

use crate::error::{ProcessError, Result};
use crate::params::{aggregate_key, ProcessParameters};
use crate::processes::{Process, ProcessData};

/// Per interval time step, collect every location's value per variable and
/// reduce with each configured function, producing a single area time
/// series over the query area.
///
/// Locations outside the query area are excluded. A time step where no
/// location has a value is omitted from the output series.
pub struct AggregateSpace;

const ID: &str = "aggregate-space";

impl Process for AggregateSpace {
    fn id(&self) -> &'static str {
        ID
    }

    fn execute(&self, input: ProcessData, params: &ProcessParameters) -> Result<ProcessData> {
        let area = params.require_area(ID)?;
        let interval = params.require_interval(ID)?;
        let functions = params.require_functions(ID)?;
        let collections = input.into_collections(ID)?;

        // Location series, restricted to the query area.
        let mut located = Vec::new();
        for collection in &collections {
            match collection {
                ObservationCollection::PointSeries(series) => {
                    if area.contains_point(series.point.lon, series.point.lat) {
                        located.push(series);
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

        let mut variables: Vec<&String> = located
            .iter()
            .flat_map(|series| series.series.keys())
            .collect();
        variables.sort();
        variables.dedup();

        let mut out = AreaSeriesObservation::new(area.clone());
        for ts in interval.iter() {
            for &variable in &variables {
                let samples: Vec<f64> = located
                    .iter()
                    .filter_map(|series| series.series.get(variable))
                    .filter_map(|times: &BTreeMap<_, _>| times.get(&ts).copied())
                    .collect();
                if samples.is_empty() {
                    continue;
                }
                for &function in functions {
                    let reduced = function.reduce(&samples);
                    if !reduced.is_nan() {
                        out.set_time_value(aggregate_key(variable, function), ts, reduced);
                    }
                }
            }
        }

        Ok(ProcessData::Collections(vec![
            ObservationCollection::AreaSeries(out),
        ]))
    }
}
