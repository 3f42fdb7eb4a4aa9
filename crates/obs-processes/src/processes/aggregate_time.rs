//! Collapse the time axis of each collection.

use std::collections::BTreeMap;

use rayon::prelude::*;

use obs_store::{
    AreaObservation, ObservationCollection, PointObservation, TimeSeries,
};

use crate::error::{ProcessError, Result};
use crate::params::{aggregate_key, ProcessParameters};
use crate::processes::{Process, ProcessData};
use crate::statistics::StatisticalFunction;

/// Per location, per variable, reduce all values across the time series
/// with each configured function, producing one non-time-indexed collection
/// per input location with `{variable}_{function}` keys.
pub struct AggregateTime;

const ID: &str = "aggregate-time";

impl Process for AggregateTime {
    fn id(&self) -> &'static str {
        ID
    }

    fn execute(&self, input: ProcessData, params: &ProcessParameters) -> Result<ProcessData> {
        let functions = params.require_functions(ID)?.to_vec();
        let collections = input.into_collections(ID)?;

        let aggregated = collections
            .into_par_iter()
            .map(|collection| match collection {
                ObservationCollection::PointSeries(series) => {
                    let mut out = PointObservation::new(series.point);
                    reduce_series(&series.series, &functions, |key, value| {
                        out.set_value(key, value)
                    });
                    Ok(ObservationCollection::Point(out))
                }
                ObservationCollection::AreaSeries(series) => {
                    let mut out = AreaObservation::new(series.area.clone());
                    reduce_series(&series.series, &functions, |key, value| {
                        out.set_value(key, value)
                    });
                    Ok(ObservationCollection::Area(out))
                }
                _ => Err(ProcessError::UnsupportedInput {
                    process: ID,
                    expected: "time-series collections",
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProcessData::Collections(aggregated))
    }
}

fn reduce_series(
    series: &BTreeMap<String, TimeSeries>,
    functions: &[StatisticalFunction],
    mut set: impl FnMut(String, f64),
) {
    for (variable, times) in series {
        let values: Vec<f64> = times.values().copied().collect();
        for &function in functions {
            let reduced = function.reduce(&values);
            if !reduced.is_nan() {
                set(aggregate_key(variable, function), reduced);
            }
        }
    }
}
