//! Collapse the step axis of a space-time grid.

use rayon::prelude::*;

use obs_store::DataArrayXy;

use crate::error::Result;
use crate::params::{aggregate_key, ProcessParameters};
use crate::processes::{Process, ProcessData};

/// Per grid cell, per variable, reduce across the time/step axis with each
/// configured function, producing a 2-D grid whose bands are the
/// `{variable}_{function}` combinations (variable-major, then function, in
/// request order). Cells with no finite sample stay NaN.
pub struct AggregateGridTime;

const ID: &str = "aggregate-grid-time";

impl Process for AggregateGridTime {
    fn id(&self) -> &'static str {
        ID
    }

    fn execute(&self, input: ProcessData, params: &ProcessParameters) -> Result<ProcessData> {
        let functions = params.require_functions(ID)?.to_vec();
        let grid = input.into_grid_xyt(ID)?;
        let (steps, height, width, variable_count) = grid.shape();

        let bands: Vec<String> = grid
            .variables()
            .iter()
            .flat_map(|variable| {
                functions
                    .iter()
                    .map(move |&function| aggregate_key(variable, function))
            })
            .collect();

        // Each output cell reduces its own column of step values.
        let planes: Vec<Vec<f64>> = (0..height * width)
            .into_par_iter()
            .map(|cell| {
                let row = cell / width;
                let col = cell % width;
                let mut out = Vec::with_capacity(bands.len());
                for variable in 0..variable_count {
                    let column: Vec<f64> = (0..steps)
                        .filter_map(|step| grid.get(step, row, col, variable))
                        .collect();
                    for &function in &functions {
                        out.push(function.reduce(&column));
                    }
                }
                out
            })
            .collect();

        let mut out = DataArrayXy::new(width, height, bands, *grid.bbox());
        for (cell, values) in planes.into_iter().enumerate() {
            let row = cell / width;
            let col = cell % width;
            for (band, value) in values.into_iter().enumerate() {
                out.set(row, col, band, value);
            }
        }

        Ok(ProcessData::GridXy(out))
    }
}
