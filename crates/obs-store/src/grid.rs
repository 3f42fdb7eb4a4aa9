//! Dense grid arrays produced by the resampler.
//!
//! Pure value containers: a rectangular block of floats plus the scalar
//! bounds every cell coordinate is derived from. Both arrays use the
//! inclusive-grid convention uniformly — the coordinate step along an axis
//! is `extent / (count - 1)`, so the first and last cells sit exactly on the
//! bounds; a one-cell axis pins to the minimum bound. A NaN cell means
//! "no data at this grid point for this variable".

use serde::{Deserialize, Serialize};

use obs_common::{BoundingBox, Granularity, TimeStamp};

/// Linear position of a cell on an inclusive axis.
#[inline]
fn axis_coord(min: f64, max: f64, index: usize, count: usize) -> f64 {
    if count < 2 {
        min
    } else {
        min + (max - min) * index as f64 / (count - 1) as f64
    }
}

/// A 2-D grid of per-variable bands over a bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArrayXy {
    width: usize,
    height: usize,
    variables: Vec<String>,
    bbox: BoundingBox,
    /// Row-major `[row][col][variable]`.
    data: Vec<f64>,
}

impl DataArrayXy {
    /// Allocate a grid filled with NaN.
    pub fn new(width: usize, height: usize, variables: Vec<String>, bbox: BoundingBox) -> Self {
        let data = vec![f64::NAN; width * height * variables.len()];
        Self {
            width,
            height,
            variables,
            bbox,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Variable names, band order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// `(height, width, variables)` dimensions.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.variables.len())
    }

    /// Longitude of a column.
    pub fn lon(&self, col: usize) -> f64 {
        axis_coord(self.bbox.min_lon, self.bbox.max_lon, col, self.width)
    }

    /// Latitude of a row.
    pub fn lat(&self, row: usize) -> f64 {
        axis_coord(self.bbox.min_lat, self.bbox.max_lat, row, self.height)
    }

    #[inline]
    fn index_of(&self, row: usize, col: usize, var: usize) -> usize {
        (row * self.width + col) * self.variables.len() + var
    }

    /// Cell value, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize, var: usize) -> Option<f64> {
        if row >= self.height || col >= self.width || var >= self.variables.len() {
            return None;
        }
        Some(self.data[self.index_of(row, col, var)])
    }

    /// Set a cell value during construction. Panics outside the grid.
    pub fn set(&mut self, row: usize, col: usize, var: usize, value: f64) {
        let index = self.index_of(row, col, var);
        self.data[index] = value;
    }

    /// The raw row-major cell block.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// A 3-D (time, lat, lon) grid of per-variable bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArrayXyt {
    steps: usize,
    width: usize,
    height: usize,
    variables: Vec<String>,
    bbox: BoundingBox,
    time_min: f64,
    time_max: f64,
    granularity: Granularity,
    /// Row-major `[step][row][col][variable]`.
    data: Vec<f64>,
}

impl DataArrayXyt {
    /// Allocate a grid filled with NaN.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        steps: usize,
        width: usize,
        height: usize,
        variables: Vec<String>,
        bbox: BoundingBox,
        time_min: f64,
        time_max: f64,
        granularity: Granularity,
    ) -> Self {
        let data = vec![f64::NAN; steps * width * height * variables.len()];
        Self {
            steps,
            width,
            height,
            variables,
            bbox,
            time_min,
            time_max,
            granularity,
            data,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Variable names, band order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// `(steps, height, width, variables)` dimensions.
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.steps, self.height, self.width, self.variables.len())
    }

    /// Longitude of a column.
    pub fn lon(&self, col: usize) -> f64 {
        axis_coord(self.bbox.min_lon, self.bbox.max_lon, col, self.width)
    }

    /// Latitude of a row.
    pub fn lat(&self, row: usize) -> f64 {
        axis_coord(self.bbox.min_lat, self.bbox.max_lat, row, self.height)
    }

    /// Time scalar of a step.
    pub fn time_scalar(&self, step: usize) -> f64 {
        axis_coord(self.time_min, self.time_max, step, self.steps)
    }

    /// Time point of a step at the grid's granularity.
    ///
    /// `None` only for scalars outside chrono's representable range, which a
    /// grid built from a valid interval cannot produce.
    pub fn timestamp(&self, step: usize) -> Option<TimeStamp> {
        self.granularity.timestamp_at(self.time_scalar(step))
    }

    #[inline]
    fn index_of(&self, step: usize, row: usize, col: usize, var: usize) -> usize {
        ((step * self.height + row) * self.width + col) * self.variables.len() + var
    }

    /// Cell value, or `None` outside the grid.
    pub fn get(&self, step: usize, row: usize, col: usize, var: usize) -> Option<f64> {
        if step >= self.steps
            || row >= self.height
            || col >= self.width
            || var >= self.variables.len()
        {
            return None;
        }
        Some(self.data[self.index_of(step, row, col, var)])
    }

    /// Set a cell value during construction. Panics outside the grid.
    pub fn set(&mut self, step: usize, row: usize, col: usize, var: usize, value: f64) {
        let index = self.index_of(step, row, col, var);
        self.data[index] = value;
    }

    /// The raw row-major cell block.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the raw cell block, for the resampler's
    /// construction pass.
    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox::new(0.0, 40.0, 10.0, 50.0)
    }

    #[test]
    fn test_xy_dimensions_and_fill() {
        let grid = DataArrayXy::new(4, 3, vec!["temp".into(), "rh".into()], bbox());
        assert_eq!(grid.shape(), (3, 4, 2));
        assert_eq!(grid.data().len(), 24);
        assert!(grid.data().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_inclusive_coordinate_mapping() {
        let grid = DataArrayXy::new(5, 3, vec!["temp".into()], bbox());
        assert_eq!(grid.lon(0), 0.0);
        assert_eq!(grid.lon(4), 10.0);
        assert_eq!(grid.lon(2), 5.0);
        assert_eq!(grid.lat(0), 40.0);
        assert_eq!(grid.lat(2), 50.0);
    }

    #[test]
    fn test_single_cell_axis_pins_to_minimum() {
        let grid = DataArrayXy::new(1, 1, vec!["temp".into()], bbox());
        assert_eq!(grid.lon(0), 0.0);
        assert_eq!(grid.lat(0), 40.0);
    }

    #[test]
    fn test_xy_get_set() {
        let mut grid = DataArrayXy::new(2, 2, vec!["temp".into()], bbox());
        grid.set(1, 0, 0, 3.5);
        assert_eq!(grid.get(1, 0, 0), Some(3.5));
        assert_eq!(grid.get(2, 0, 0), None);
        assert_eq!(grid.get(0, 0, 1), None);
    }

    #[test]
    fn test_xyt_time_axis() {
        let grid = DataArrayXyt::new(
            3,
            2,
            2,
            vec!["temp".into()],
            bbox(),
            0.0,
            7200.0,
            Granularity::DateTime,
        );
        assert_eq!(grid.time_scalar(0), 0.0);
        assert_eq!(grid.time_scalar(1), 3600.0);
        assert_eq!(grid.time_scalar(2), 7200.0);

        let ts = grid.timestamp(1).unwrap();
        assert_eq!(ts.as_scalar(), 3600.0);
    }

    #[test]
    fn test_xyt_shape_and_indexing() {
        let mut grid = DataArrayXyt::new(
            2,
            3,
            2,
            vec!["a".into(), "b".into()],
            bbox(),
            0.0,
            3600.0,
            Granularity::DateTime,
        );
        assert_eq!(grid.shape(), (2, 2, 3, 2));
        assert_eq!(grid.data().len(), 24);
        grid.set(1, 1, 2, 1, 9.0);
        assert_eq!(grid.get(1, 1, 2, 1), Some(9.0));
        assert_eq!(grid.get(2, 0, 0, 0), None);
    }
}
