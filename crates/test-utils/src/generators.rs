//! Synthetic observation generators.
//!
//! These generators create predictable, verifiable observation streams:
//! values come from simple analytic fields so tests can check interpolated
//! results against the closed form instead of golden files.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use obs_common::TimeStamp;

use crate::fixtures::{date_stamp, STATIONS};

/// One synthetic observation tuple, ready to feed into a store builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticObservation {
    pub lon: f64,
    pub lat: f64,
    pub time: TimeStamp,
    pub variable: &'static str,
    pub value: f64,
    pub station_code: Option<&'static str>,
    pub station_name: Option<&'static str>,
}

/// A planar field: value = `base + lon_slope * lon + lat_slope * lat`.
///
/// Inverse-distance and cubic interpolation both reproduce affine fields
/// closely, which makes deviations easy to spot.
pub fn planar_field(base: f64, lon_slope: f64, lat_slope: f64, lon: f64, lat: f64) -> f64 {
    base + lon_slope * lon + lat_slope * lat
}

/// Observations of a planar `temp` field at every fixture station over the
/// given number of days.
pub fn planar_station_observations(days: u32) -> Vec<SyntheticObservation> {
    let mut observations = Vec::new();
    for day in 0..days {
        for station in &STATIONS {
            observations.push(SyntheticObservation {
                lon: station.2,
                lat: station.3,
                time: date_stamp(day),
                variable: "temp",
                value: planar_field(10.0, 0.5, -0.25, station.2, station.3) + day as f64,
                station_code: Some(station.0),
                station_name: Some(station.1),
            });
        }
    }
    observations
}

/// Seeded random observations scattered over the fixture bbox.
///
/// Deterministic for a given seed; positions are unique with overwhelming
/// likelihood, values are uniform in `[value_min, value_max)`.
pub fn random_observations(
    seed: u64,
    count: usize,
    value_min: f64,
    value_max: f64,
) -> Vec<SyntheticObservation> {
    let bbox = crate::fixtures::test_bbox();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| SyntheticObservation {
            lon: rng.gen_range(bbox.min_lon..bbox.max_lon),
            lat: rng.gen_range(bbox.min_lat..bbox.max_lat),
            time: date_stamp((i % 5) as u32),
            variable: "temp",
            value: rng.gen_range(value_min..value_max),
            station_code: None,
            station_name: None,
        })
        .collect()
}
