//! Columnar observation store with interpolation and grid resampling.
//!
//! This crate is the core of the observation engine. A producer streams
//! `(station, lon, lat, time, variable, value)` tuples into an
//! [`ObservationsBuilder`]; the frozen [`Observations`] store answers three
//! classes of queries:
//!
//! - **Point interpolation**: estimate every variable at an arbitrary point
//!   for each step of a time interval.
//! - **Station interpolation**: estimate every variable at every distinct
//!   observed location, one time series per station.
//! - **Grid resampling**: evaluate every variable on a regular
//!   `(time, lat, lon)` grid, producing a dense [`DataArrayXyt`].
//!
//! # Architecture
//!
//! ```text
//! producer stream
//!      │ add_value()           single-writer ingestion
//!      ▼
//! ObservationsBuilder ── build() ──► Observations (frozen, Sync)
//!                                        │
//!                ┌───────────────────────┼──────────────────────┐
//!                ▼                       ▼                      ▼
//!        interpolate_at()      interpolate_positions()  resample_to_grid()
//!        point time series     station time series      DataArrayXyt
//! ```
//!
//! Interpolation algorithms are injected through
//! [`interpolate::InterpolatorProvider`]; the stock
//! [`interpolate::DefaultProvider`] uses inverse-distance weighting in
//! space-time and Catmull-Rom cubics for single-station series. Undefined
//! values are NaN sentinels throughout, never errors.

pub mod collection;
pub mod config;
pub mod error;
pub mod grid;
pub mod interpolate;
pub mod store;

// Re-export commonly used types at crate root
pub use collection::{
    AreaObservation, AreaSeriesObservation, ObservationCollection, PointObservation,
    PointSeriesObservation, TimeSeries,
};
pub use config::{DedupPolicy, ResampleConfig};
pub use error::{Result, StoreError};
pub use grid::{DataArrayXy, DataArrayXyt};
pub use interpolate::{DefaultProvider, InterpolatorProvider, SeriesInterpolator, SpatialInterpolator};
pub use store::{GridSpec, Observations, ObservationsBuilder, StationPosition};
