//! Output containers for interpolated and aggregated observations.
//!
//! The four shapes are the product of `{point, area} × {single value,
//! time series}`, expressed as one sum type so downstream pattern matching
//! is exhaustive. Value maps are keyed by `variable` or, after aggregation,
//! `{variable}_{function}`. Collections are built by the producing stage and
//! read-only afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use obs_common::{MultiPolygon, Point, TimeStamp};

/// A per-variable time series, keyed by time point.
pub type TimeSeries = BTreeMap<TimeStamp, f64>;

/// A single point with one value per variable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointObservation {
    pub point: Point,
    pub values: BTreeMap<String, f64>,
}

impl PointObservation {
    /// Create an empty point observation.
    pub fn new(point: Point) -> Self {
        Self {
            point,
            values: BTreeMap::new(),
        }
    }

    /// Set a value during construction.
    pub fn set_value(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }
}

/// A point (usually a station) with a time series per variable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSeriesObservation {
    pub point: Point,
    /// Station code, when the point corresponds to a known station.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_code: Option<String>,
    /// Human-readable station name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    #[serde(with = "time_keyed")]
    pub series: BTreeMap<String, TimeSeries>,
}

impl PointSeriesObservation {
    /// Create an empty point time series.
    pub fn new(point: Point) -> Self {
        Self {
            point,
            station_code: None,
            station_name: None,
            series: BTreeMap::new(),
        }
    }

    /// Attach the station identity.
    pub fn with_station(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.station_code = Some(code.into());
        self.station_name = Some(name.into());
        self
    }

    /// Set one time step's value during construction.
    pub fn set_time_value(&mut self, key: impl Into<String>, time: TimeStamp, value: f64) {
        self.series.entry(key.into()).or_default().insert(time, value);
    }
}

/// An area with one value per variable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaObservation {
    pub area: MultiPolygon,
    pub values: BTreeMap<String, f64>,
}

impl AreaObservation {
    /// Create an empty area observation.
    pub fn new(area: MultiPolygon) -> Self {
        Self {
            area,
            values: BTreeMap::new(),
        }
    }

    /// Set a value during construction.
    pub fn set_value(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }
}

/// An area with a time series per variable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSeriesObservation {
    pub area: MultiPolygon,
    #[serde(with = "time_keyed")]
    pub series: BTreeMap<String, TimeSeries>,
}

impl AreaSeriesObservation {
    /// Create an empty area time series.
    pub fn new(area: MultiPolygon) -> Self {
        Self {
            area,
            series: BTreeMap::new(),
        }
    }

    /// Set one time step's value during construction.
    pub fn set_time_value(&mut self, key: impl Into<String>, time: TimeStamp, value: f64) {
        self.series.entry(key.into()).or_default().insert(time, value);
    }
}

/// Any observation collection shape the engine can hand to an encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ObservationCollection {
    Point(PointObservation),
    PointSeries(PointSeriesObservation),
    Area(AreaObservation),
    AreaSeries(AreaSeriesObservation),
}

impl ObservationCollection {
    /// True when the collection carries a time axis.
    pub fn is_time_series(&self) -> bool {
        matches!(self, Self::PointSeries(_) | Self::AreaSeries(_))
    }
}

/// Serde adapter turning `TimeStamp` map keys into their lexical form, so a
/// time series round-trips through formats with string-only map keys.
mod time_keyed {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use obs_common::TimeStamp;

    use super::TimeSeries;

    pub fn serialize<S: Serializer>(
        series: &BTreeMap<String, TimeSeries>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let by_text: BTreeMap<&String, BTreeMap<String, f64>> = series
            .iter()
            .map(|(key, times)| {
                (
                    key,
                    times.iter().map(|(ts, &v)| (ts.to_string(), v)).collect(),
                )
            })
            .collect();
        by_text.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, TimeSeries>, D::Error> {
        let by_text: BTreeMap<String, BTreeMap<String, f64>> =
            BTreeMap::deserialize(deserializer)?;
        by_text
            .into_iter()
            .map(|(key, times)| {
                let parsed = times
                    .into_iter()
                    .map(|(text, v)| {
                        text.parse::<TimeStamp>()
                            .map(|ts| (ts, v))
                            .map_err(D::Error::custom)
                    })
                    .collect::<Result<TimeSeries, _>>()?;
                Ok((key, parsed))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> TimeStamp {
        TimeStamp::Date(NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
    }

    #[test]
    fn test_point_series_setters() {
        let mut obs = PointSeriesObservation::new(Point::new(8.5, 49.1))
            .with_station("10637", "Frankfurt");
        obs.set_time_value("temp", day(1), 10.0);
        obs.set_time_value("temp", day(2), 20.0);
        obs.set_time_value("rh", day(1), 80.0);

        assert_eq!(obs.series["temp"].len(), 2);
        assert_eq!(obs.series["temp"][&day(2)], 20.0);
        assert_eq!(obs.series["rh"][&day(1)], 80.0);
    }

    #[test]
    fn test_collection_shape_predicates() {
        let point = ObservationCollection::Point(PointObservation::new(Point::new(0.0, 0.0)));
        let series = ObservationCollection::PointSeries(PointSeriesObservation::new(
            Point::new(0.0, 0.0),
        ));
        assert!(!point.is_time_series());
        assert!(series.is_time_series());
    }

    #[test]
    fn test_series_serializes_with_lexical_time_keys() {
        let mut obs = PointSeriesObservation::new(Point::new(8.5, 49.1));
        obs.set_time_value("temp", day(1), 10.0);

        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["series"]["temp"]["2024-03-01"], 10.0);

        let back: PointSeriesObservation = serde_json::from_value(json).unwrap();
        assert_eq!(back, obs);
    }
}
