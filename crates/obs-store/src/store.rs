//! Columnar observation store.
//!
//! Ingestion is single-writer: a producer streams tuples into an
//! [`ObservationsBuilder`], which owns the dictionary maps and the duplicate
//! filter. [`ObservationsBuilder::build`] freezes the columns into an
//! [`Observations`] that only exposes read paths, so the query phase can fan
//! out across threads without any locking — immutability is enforced by
//! construction, not at runtime.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, warn};

use obs_common::{BoundingBox, Point, TemporalInterval, TimeStamp};

use crate::collection::{ObservationCollection, PointSeriesObservation, TimeSeries};
use crate::config::{DedupPolicy, ResampleConfig};
use crate::error::{Result, StoreError};
use crate::grid::DataArrayXyt;
use crate::interpolate::InterpolatorProvider;

/// One dictionary-encoded station.
#[derive(Debug, Clone, PartialEq)]
struct Station {
    code: String,
    name: String,
    /// Ordinal of the observation that introduced this station; its row
    /// supplies the station's coordinates.
    first_ordinal: usize,
}

/// A distinct observed location, as returned by
/// [`Observations::unique_positions`].
#[derive(Debug, Clone, PartialEq)]
pub struct StationPosition {
    pub point: Point,
    pub code: String,
    pub name: String,
}

/// Dimensions of a grid resampling request.
///
/// `width`/`height` may be derived from each other via the bbox aspect
/// ratio; `steps` defaults to the interval's own step count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub bbox: BoundingBox,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub steps: Option<usize>,
}

impl GridSpec {
    /// A spec with all dimensions left to their defaults.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            width: None,
            height: None,
            steps: None,
        }
    }
}

/// Mutable ingestion side of the store.
///
/// Sized once with the producer's declared feature count; populated by
/// repeated [`add_value`](Self::add_value) calls; frozen with
/// [`build`](Self::build) when the stream ends.
#[derive(Debug)]
pub struct ObservationsBuilder {
    capacity: usize,
    dedup: DedupPolicy,
    lons: Vec<f64>,
    lats: Vec<f64>,
    times: Vec<f64>,
    values: Vec<f64>,
    variable_index: Vec<u32>,
    station_index: Vec<u32>,
    variables: Vec<String>,
    variable_lookup: HashMap<String, u32>,
    stations: Vec<Station>,
    station_lookup: HashMap<String, u32>,
    hashes: HashSet<u64>,
    duplicates: usize,
}

impl ObservationsBuilder {
    /// Create a builder for the declared number of observations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            dedup: DedupPolicy::default(),
            lons: Vec::with_capacity(capacity),
            lats: Vec::with_capacity(capacity),
            times: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            variable_index: Vec::with_capacity(capacity),
            station_index: Vec::with_capacity(capacity),
            variables: Vec::new(),
            variable_lookup: HashMap::new(),
            stations: Vec::new(),
            station_lookup: HashMap::new(),
            hashes: HashSet::with_capacity(capacity),
            duplicates: 0,
        }
    }

    /// Override the duplicate-detection policy.
    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }

    /// Number of observations stored so far.
    pub fn len(&self) -> usize {
        self.lons.len()
    }

    /// True before the first accepted observation.
    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    /// Number of duplicates dropped so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Dictionary-encode a variable name. Idempotent; ids are dense,
    /// zero-based, in first-seen order.
    pub fn variable_id(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.variable_lookup.get(name) {
            return id;
        }
        let id = self.variables.len() as u32;
        self.variables.push(name.to_string());
        self.variable_lookup.insert(name.to_string(), id);
        id
    }

    /// Append one observation.
    ///
    /// Returns `Ok(false)` when the `(lon, lat, time, variable)` tuple is a
    /// duplicate under the dedup policy; the record is dropped with a
    /// warning and ingestion continues. Exceeding the declared capacity or
    /// passing a variable id that was never assigned is a usage error.
    #[allow(clippy::too_many_arguments)]
    pub fn add_value(
        &mut self,
        lon: f64,
        lat: f64,
        time: TimeStamp,
        variable: u32,
        value: f64,
        station_code: Option<&str>,
        station_name: Option<&str>,
    ) -> Result<bool> {
        if variable as usize >= self.variables.len() {
            return Err(StoreError::UnknownVariable(variable));
        }
        if self.lons.len() >= self.capacity {
            return Err(StoreError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let scalar = time.as_scalar();
        let key = self.dedup.key(lon, lat, scalar, variable);
        if !self.hashes.insert(key) {
            self.duplicates += 1;
            warn!(
                lon,
                lat,
                time = %time,
                variable = %self.variables[variable as usize],
                "duplicate observation dropped"
            );
            return Ok(false);
        }

        // Stations without a code are keyed by their quantized position, so
        // every distinct location remains addressable as a station.
        let derived_code;
        let code = match station_code {
            Some(code) => code,
            None => {
                derived_code = self.dedup.position_key(lon, lat);
                &derived_code
            }
        };
        let ordinal = self.lons.len();
        let station = match self.station_lookup.get(code) {
            Some(&idx) => idx,
            None => {
                let idx = self.stations.len() as u32;
                self.stations.push(Station {
                    code: code.to_string(),
                    name: station_name.unwrap_or(code).to_string(),
                    first_ordinal: ordinal,
                });
                self.station_lookup.insert(code.to_string(), idx);
                idx
            }
        };

        self.lons.push(lon);
        self.lats.push(lat);
        self.times.push(scalar);
        self.values.push(value);
        self.variable_index.push(variable);
        self.station_index.push(station);
        Ok(true)
    }

    /// Freeze the builder into a read-only store.
    pub fn build(self) -> Observations {
        debug!(
            count = self.lons.len(),
            capacity = self.capacity,
            variables = self.variables.len(),
            stations = self.stations.len(),
            duplicates = self.duplicates,
            "observation ingestion complete"
        );
        Observations {
            lons: self.lons,
            lats: self.lats,
            times: self.times,
            values: self.values,
            variable_index: self.variable_index,
            station_index: self.station_index,
            variables: self.variables,
            variable_lookup: self.variable_lookup,
            stations: self.stations,
            dedup: self.dedup,
        }
    }
}

/// Frozen, read-only observation store.
///
/// All query paths are read-only over the finished columns and safe to run
/// concurrently; the heavy ones parallelize internally with rayon.
#[derive(Debug, Clone)]
pub struct Observations {
    lons: Vec<f64>,
    lats: Vec<f64>,
    times: Vec<f64>,
    values: Vec<f64>,
    variable_index: Vec<u32>,
    station_index: Vec<u32>,
    variables: Vec<String>,
    variable_lookup: HashMap<String, u32>,
    stations: Vec<Station>,
    dedup: DedupPolicy,
}

impl Observations {
    /// Number of stored observations.
    pub fn len(&self) -> usize {
        self.lons.len()
    }

    /// True when the store holds no observations.
    pub fn is_empty(&self) -> bool {
        self.lons.is_empty()
    }

    /// Variable names in id order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Look up a variable id by name.
    pub fn variable_id(&self, name: &str) -> Option<u32> {
        self.variable_lookup.get(name).copied()
    }

    /// The stored value for an exact `(lon, lat, time, variable)` match
    /// under the dedup quantization, if any.
    pub fn exact_value(&self, lon: f64, lat: f64, time: TimeStamp, variable: u32) -> Option<f64> {
        let scalar = time.as_scalar();
        (0..self.len()).find_map(|row| {
            (self.variable_index[row] == variable
                && self.dedup.quantize_coord(self.lons[row]) == self.dedup.quantize_coord(lon)
                && self.dedup.quantize_coord(self.lats[row]) == self.dedup.quantize_coord(lat)
                && self.dedup.quantize_time(self.times[row]) == self.dedup.quantize_time(scalar))
            .then(|| self.values[row])
        })
    }

    /// Materialize a sub-store with only the given variable's rows.
    pub fn filter_variable(&self, variable: u32) -> Observations {
        self.filter_rows(|row| self.variable_index[row] == variable)
    }

    /// Materialize a sub-store with only the rows at the given position
    /// (exact lon/lat equality).
    pub fn filter_position(&self, point: &Point) -> Observations {
        self.filter_rows(|row| self.lons[row] == point.lon && self.lats[row] == point.lat)
    }

    /// Copy the rows matching a predicate into a new store, renumbering the
    /// station dictionary against the surviving rows.
    fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> Observations {
        let mut out = Observations {
            lons: Vec::new(),
            lats: Vec::new(),
            times: Vec::new(),
            values: Vec::new(),
            variable_index: Vec::new(),
            station_index: Vec::new(),
            variables: self.variables.clone(),
            variable_lookup: self.variable_lookup.clone(),
            stations: Vec::new(),
            dedup: self.dedup,
        };
        let mut station_remap: HashMap<u32, u32> = HashMap::new();

        for row in 0..self.len() {
            if !keep(row) {
                continue;
            }
            let old_station = self.station_index[row];
            let ordinal = out.lons.len();
            let new_station = *station_remap.entry(old_station).or_insert_with(|| {
                let source = &self.stations[old_station as usize];
                out.stations.push(Station {
                    code: source.code.clone(),
                    name: source.name.clone(),
                    first_ordinal: ordinal,
                });
                (out.stations.len() - 1) as u32
            });
            out.lons.push(self.lons[row]);
            out.lats.push(self.lats[row]);
            out.times.push(self.times[row]);
            out.values.push(self.values[row]);
            out.variable_index.push(self.variable_index[row]);
            out.station_index.push(new_station);
        }
        out
    }

    /// One entry per distinct station, in first-seen order.
    pub fn unique_positions(&self) -> Vec<StationPosition> {
        self.stations
            .iter()
            .map(|station| StationPosition {
                point: Point::new(
                    self.lons[station.first_ordinal],
                    self.lats[station.first_ordinal],
                ),
                code: station.code.clone(),
                name: station.name.clone(),
            })
            .collect()
    }

    /// Interpolate every variable at an arbitrary point over an interval.
    ///
    /// Builds one scattered space-time interpolator per variable over that
    /// variable's full sample set and evaluates it at each interval step.
    /// A step that exactly matches a stored sample short-circuits to the
    /// stored value; NaN evaluations are omitted from the result, and a
    /// variable with no resolvable steps is omitted entirely.
    pub fn interpolate_at(
        &self,
        point: &Point,
        interval: &TemporalInterval,
        provider: &dyn InterpolatorProvider,
    ) -> ObservationCollection {
        let step_times: Vec<TimeStamp> = interval.iter().collect();

        let per_variable: Vec<(String, TimeSeries)> = (0..self.variables.len() as u32)
            .into_par_iter()
            .map(|variable| {
                let sub = self.filter_variable(variable);
                let interpolator = provider.spatial(&sub.coordinate_rows(), &sub.values);

                let mut series = TimeSeries::new();
                for &ts in &step_times {
                    let value = match sub.exact_value(point.lon, point.lat, ts, variable) {
                        Some(stored) => stored,
                        None => interpolator.evaluate(point.lon, point.lat, ts.as_scalar()),
                    };
                    if !value.is_nan() {
                        series.insert(ts, value);
                    }
                }
                (self.variables[variable as usize].clone(), series)
            })
            .collect();

        let mut observation = PointSeriesObservation::new(*point);
        for (name, series) in per_variable {
            if !series.is_empty() {
                observation.series.insert(name, series);
            }
        }
        ObservationCollection::PointSeries(observation)
    }

    /// Interpolate every variable at every distinct station over an
    /// interval.
    ///
    /// Each station gets a 1-D temporal interpolator per variable built from
    /// its own samples: out-of-range steps clamp to the nearest stored
    /// sample, in-range steps interpolate cubically, and a single-sample
    /// series is a constant.
    pub fn interpolate_positions(
        &self,
        interval: &TemporalInterval,
        provider: &dyn InterpolatorProvider,
    ) -> Vec<ObservationCollection> {
        let step_times: Vec<TimeStamp> = interval.iter().collect();

        self.stations
            .par_iter()
            .enumerate()
            .map(|(station_idx, station)| {
                let point = Point::new(
                    self.lons[station.first_ordinal],
                    self.lats[station.first_ordinal],
                );
                let mut observation = PointSeriesObservation::new(point)
                    .with_station(&station.code, &station.name);

                for (variable, name) in self.variables.iter().enumerate() {
                    let mut times = Vec::new();
                    let mut values = Vec::new();
                    for row in 0..self.len() {
                        if self.station_index[row] as usize == station_idx
                            && self.variable_index[row] as usize == variable
                        {
                            times.push(self.times[row]);
                            values.push(self.values[row]);
                        }
                    }
                    if times.is_empty() {
                        continue;
                    }
                    let interpolator = provider.series(&times, &values);
                    for &ts in &step_times {
                        let value = interpolator.evaluate(ts.as_scalar());
                        if !value.is_nan() {
                            observation.set_time_value(name.as_str(), ts, value);
                        }
                    }
                }
                ObservationCollection::PointSeries(observation)
            })
            .collect()
    }

    /// Resample all variables onto a regular space-time grid.
    ///
    /// The dominant cost of the engine: one interpolator evaluation per
    /// `(variable, step, row, col)` cell, parallelized over cells. Missing
    /// values stay NaN in the output; dimensions are always exactly
    /// `(steps, height, width, variables)`.
    pub fn resample_to_grid(
        &self,
        spec: &GridSpec,
        interval: &TemporalInterval,
        config: &ResampleConfig,
        provider: &dyn InterpolatorProvider,
    ) -> Result<DataArrayXyt> {
        let (width, height) = resolve_grid_dims(spec, config)?;
        let steps = match spec.steps {
            Some(0) => {
                return Err(StoreError::InvalidGrid(
                    "steps must be at least 1".to_string(),
                ))
            }
            Some(steps) => steps,
            None => interval.steps(),
        };

        let variable_count = self.variables.len();
        debug!(
            width,
            height,
            steps,
            variables = variable_count,
            observations = self.len(),
            "resampling observations to grid"
        );

        let mut grid = DataArrayXyt::new(
            steps,
            width,
            height,
            self.variables.clone(),
            spec.bbox,
            interval.begin_scalar(),
            interval.end_scalar(),
            interval.granularity(),
        );

        let cell_count = steps * height * width;
        for variable in 0..variable_count as u32 {
            let sub = self.filter_variable(variable);
            let interpolator = provider.spatial(&sub.coordinate_rows(), &sub.values);

            // Every cell is an independent read-only evaluation.
            let plane: Vec<f64> = (0..cell_count)
                .into_par_iter()
                .map(|cell| {
                    let step = cell / (height * width);
                    let rest = cell % (height * width);
                    let row = rest / width;
                    let col = rest % width;
                    interpolator.evaluate(grid.lon(col), grid.lat(row), grid.time_scalar(step))
                })
                .collect();

            let data = grid.data_mut();
            for (cell, value) in plane.into_iter().enumerate() {
                data[cell * variable_count + variable as usize] = value;
            }
        }

        Ok(grid)
    }

    /// The `(lon, lat, time)` coordinate rows, for interpolator building.
    fn coordinate_rows(&self) -> Vec<[f64; 3]> {
        (0..self.len())
            .map(|row| [self.lons[row], self.lats[row], self.times[row]])
            .collect()
    }
}

/// Resolve grid width/height from the spec and the bbox aspect ratio.
fn resolve_grid_dims(spec: &GridSpec, config: &ResampleConfig) -> Result<(usize, usize)> {
    if spec.width == Some(0) || spec.height == Some(0) {
        return Err(StoreError::InvalidGrid(
            "width and height must be at least 1".to_string(),
        ));
    }

    let aspect = spec.bbox.height() / spec.bbox.width();
    let derive = |base: usize, ratio: f64| -> usize {
        if !ratio.is_finite() || ratio <= 0.0 {
            return 1;
        }
        ((base as f64 * ratio).round() as usize).max(1)
    };

    Ok(match (spec.width, spec.height) {
        (Some(width), Some(height)) => (width, height),
        (Some(width), None) => (width, derive(width, aspect)),
        (None, Some(height)) => (derive(height, 1.0 / aspect), height),
        (None, None) => (config.default_width, derive(config.default_width, aspect)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::DefaultProvider;
    use chrono::NaiveDate;

    fn day(d: u32) -> TimeStamp {
        TimeStamp::Date(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
    }

    fn builder_with_temp() -> (ObservationsBuilder, u32) {
        let mut builder = ObservationsBuilder::with_capacity(16);
        let temp = builder.variable_id("temp");
        (builder, temp)
    }

    #[test]
    fn test_variable_id_is_idempotent_and_dense() {
        let mut builder = ObservationsBuilder::with_capacity(4);
        assert_eq!(builder.variable_id("temp"), 0);
        assert_eq!(builder.variable_id("rh"), 1);
        assert_eq!(builder.variable_id("temp"), 0);
        assert_eq!(builder.variable_id("rh"), 1);
    }

    #[test]
    fn test_add_value_then_exact_query() {
        let (mut builder, temp) = builder_with_temp();
        assert!(builder
            .add_value(8.5, 49.1, day(1), temp, 12.5, Some("10637"), Some("Frankfurt"))
            .unwrap());
        let store = builder.build();
        assert_eq!(store.len(), 1);
        assert_eq!(store.exact_value(8.5, 49.1, day(1), temp), Some(12.5));
        assert_eq!(store.exact_value(8.5, 49.2, day(1), temp), None);
        assert_eq!(store.exact_value(8.5, 49.1, day(2), temp), None);
    }

    #[test]
    fn test_duplicate_is_rejected_and_count_unchanged() {
        let (mut builder, temp) = builder_with_temp();
        assert!(builder
            .add_value(8.5, 49.1, day(1), temp, 12.5, None, None)
            .unwrap());
        assert!(!builder
            .add_value(8.5, 49.1, day(1), temp, 99.0, None, None)
            .unwrap());
        assert_eq!(builder.len(), 1);
        assert_eq!(builder.duplicates(), 1);

        // Same tuple with a different variable is not a duplicate.
        let rh = builder.variable_id("rh");
        assert!(builder
            .add_value(8.5, 49.1, day(1), rh, 80.0, None, None)
            .unwrap());
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut builder = ObservationsBuilder::with_capacity(1);
        let temp = builder.variable_id("temp");
        builder
            .add_value(8.5, 49.1, day(1), temp, 1.0, None, None)
            .unwrap();
        let err = builder
            .add_value(8.6, 49.1, day(1), temp, 2.0, None, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { capacity: 1 }));
    }

    #[test]
    fn test_unassigned_variable_id_is_rejected() {
        let (mut builder, _) = builder_with_temp();
        let err = builder
            .add_value(8.5, 49.1, day(1), 7, 1.0, None, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownVariable(7)));
    }

    #[test]
    fn test_unique_positions_first_seen_order() {
        let (mut builder, temp) = builder_with_temp();
        builder
            .add_value(8.5, 49.1, day(1), temp, 1.0, Some("B"), Some("Berlin"))
            .unwrap();
        builder
            .add_value(9.0, 48.5, day(1), temp, 2.0, Some("S"), Some("Stuttgart"))
            .unwrap();
        builder
            .add_value(8.5, 49.1, day(2), temp, 3.0, Some("B"), Some("Berlin"))
            .unwrap();
        let store = builder.build();

        let positions = store.unique_positions();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].code, "B");
        assert_eq!(positions[0].name, "Berlin");
        assert_eq!(positions[0].point, Point::new(8.5, 49.1));
        assert_eq!(positions[1].code, "S");
    }

    #[test]
    fn test_codeless_observations_get_positional_stations() {
        let (mut builder, temp) = builder_with_temp();
        builder
            .add_value(8.5, 49.1, day(1), temp, 1.0, None, None)
            .unwrap();
        builder
            .add_value(8.5, 49.1, day(2), temp, 2.0, None, None)
            .unwrap();
        builder
            .add_value(9.0, 48.5, day(1), temp, 3.0, None, None)
            .unwrap();
        let store = builder.build();
        assert_eq!(store.unique_positions().len(), 2);
    }

    #[test]
    fn test_filter_variable() {
        let (mut builder, temp) = builder_with_temp();
        let rh = builder.variable_id("rh");
        builder
            .add_value(8.5, 49.1, day(1), temp, 1.0, None, None)
            .unwrap();
        builder
            .add_value(8.5, 49.1, day(1), rh, 80.0, None, None)
            .unwrap();
        let store = builder.build();

        let only_rh = store.filter_variable(rh);
        assert_eq!(only_rh.len(), 1);
        assert_eq!(only_rh.exact_value(8.5, 49.1, day(1), rh), Some(80.0));
        assert_eq!(only_rh.exact_value(8.5, 49.1, day(1), temp), None);
        // Dictionaries survive filtering.
        assert_eq!(only_rh.variable_id("rh"), Some(rh));
    }

    #[test]
    fn test_filter_position() {
        let (mut builder, temp) = builder_with_temp();
        builder
            .add_value(8.5, 49.1, day(1), temp, 1.0, Some("B"), None)
            .unwrap();
        builder
            .add_value(9.0, 48.5, day(1), temp, 2.0, Some("S"), None)
            .unwrap();
        let store = builder.build();

        let at_b = store.filter_position(&Point::new(8.5, 49.1));
        assert_eq!(at_b.len(), 1);
        assert_eq!(at_b.unique_positions().len(), 1);
        assert_eq!(at_b.unique_positions()[0].code, "B");
    }

    #[test]
    fn test_resolve_grid_dims() {
        let config = ResampleConfig::default();
        let square = GridSpec::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(resolve_grid_dims(&square, &config).unwrap(), (200, 200));

        let wide = GridSpec {
            width: Some(100),
            ..GridSpec::new(BoundingBox::new(0.0, 0.0, 20.0, 10.0))
        };
        assert_eq!(resolve_grid_dims(&wide, &config).unwrap(), (100, 50));

        let tall = GridSpec {
            height: Some(50),
            ..GridSpec::new(BoundingBox::new(0.0, 0.0, 20.0, 10.0))
        };
        assert_eq!(resolve_grid_dims(&tall, &config).unwrap(), (100, 50));

        let zero = GridSpec {
            width: Some(0),
            ..GridSpec::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0))
        };
        assert!(resolve_grid_dims(&zero, &config).is_err());
    }

    #[test]
    fn test_interpolate_at_omits_empty_variables() {
        let (mut builder, temp) = builder_with_temp();
        builder.variable_id("rh"); // declared but never observed
        builder
            .add_value(8.5, 49.1, day(1), temp, 10.0, None, None)
            .unwrap();
        let store = builder.build();

        let interval = TemporalInterval::dates(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            1,
        )
        .unwrap();
        let provider = DefaultProvider::default();
        let ObservationCollection::PointSeries(obs) =
            store.interpolate_at(&Point::new(8.5, 49.1), &interval, &provider)
        else {
            panic!("expected a point series");
        };
        assert!(obs.series.contains_key("temp"));
        assert!(!obs.series.contains_key("rh"));
    }
}
