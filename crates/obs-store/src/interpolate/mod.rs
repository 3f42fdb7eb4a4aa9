//! Interpolator seam.
//!
//! The store never commits to a concrete interpolation algorithm. It asks an
//! [`InterpolatorProvider`] to build an interpolator from parallel coordinate
//! and value slices, then evaluates it; undefined regions come back as NaN
//! and are dropped downstream. Swapping the algorithm (e.g. for a
//! natural-neighbor scheme) touches nothing but the provider.

mod idw;
mod series;

pub use idw::{IdwConfig, InverseDistanceInterpolator};
pub use series::CubicSeriesInterpolator;

/// A scattered-data field over `(lon, lat, time-scalar)`.
///
/// Implementations are read-only after construction and safe to evaluate
/// from many threads at once.
pub trait SpatialInterpolator: Send + Sync {
    /// Estimate the field value at a point. NaN means "no value here".
    fn evaluate(&self, lon: f64, lat: f64, time: f64) -> f64;
}

/// A one-dimensional time series interpolator.
pub trait SeriesInterpolator: Send + Sync {
    /// Estimate the series value at a time scalar. NaN means "no value".
    fn evaluate(&self, time: f64) -> f64;
}

/// Builds interpolators from raw sample arrays.
pub trait InterpolatorProvider: Send + Sync {
    /// Build a spatial interpolator from `(lon, lat, time)` coordinate rows
    /// and their values. Rows with a NaN value are ignored.
    fn spatial(&self, coords: &[[f64; 3]], values: &[f64]) -> Box<dyn SpatialInterpolator>;

    /// Build a series interpolator from time scalars and values.
    /// Rows with a NaN value are ignored.
    fn series(&self, times: &[f64], values: &[f64]) -> Box<dyn SeriesInterpolator>;
}

/// The stock provider: inverse-distance weighting in space-time, uniform
/// Catmull-Rom cubic for single-station series.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProvider {
    pub idw: IdwConfig,
}

impl InterpolatorProvider for DefaultProvider {
    fn spatial(&self, coords: &[[f64; 3]], values: &[f64]) -> Box<dyn SpatialInterpolator> {
        Box::new(InverseDistanceInterpolator::new(coords, values, self.idw))
    }

    fn series(&self, times: &[f64], values: &[f64]) -> Box<dyn SeriesInterpolator> {
        Box::new(CubicSeriesInterpolator::new(times, values))
    }
}
