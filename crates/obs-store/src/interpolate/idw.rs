//! Inverse-distance weighting over scattered space-time samples.

use super::SpatialInterpolator;

/// Tunables for [`InverseDistanceInterpolator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdwConfig {
    /// Distance exponent. 2 gives the classic 1/d² weighting.
    pub power: f64,
    /// Squared normalized distance below which a sample counts as an exact
    /// hit and its value is returned unweighted.
    pub exact_eps: f64,
}

impl Default for IdwConfig {
    fn default() -> Self {
        Self {
            power: 2.0,
            exact_eps: 1e-12,
        }
    }
}

/// Shepard-style inverse-distance interpolator over `(lon, lat, time)`.
///
/// Longitude, latitude, and the time scalar live on wildly different scales,
/// so each axis is normalized by its sample extent before distances are
/// taken; an axis with zero extent drops out of the metric. A query that
/// lands exactly on a sample returns that sample's value; an interpolator
/// built from no (finite) samples returns NaN everywhere; a single sample
/// extends as a constant field.
pub struct InverseDistanceInterpolator {
    samples: Vec<[f64; 3]>,
    values: Vec<f64>,
    offset: [f64; 3],
    scale: [f64; 3],
    config: IdwConfig,
}

impl InverseDistanceInterpolator {
    /// Build from coordinate rows and values, skipping NaN values.
    pub fn new(coords: &[[f64; 3]], values: &[f64], config: IdwConfig) -> Self {
        let mut samples = Vec::with_capacity(values.len());
        let mut kept_values = Vec::with_capacity(values.len());
        for (row, &value) in coords.iter().zip(values) {
            if value.is_nan() {
                continue;
            }
            samples.push(*row);
            kept_values.push(value);
        }

        let mut offset = [0.0; 3];
        let mut scale = [0.0; 3];
        for axis in 0..3 {
            let mut min = f64::MAX;
            let mut max = f64::MIN;
            for row in &samples {
                min = min.min(row[axis]);
                max = max.max(row[axis]);
            }
            if samples.is_empty() || max <= min {
                offset[axis] = 0.0;
                scale[axis] = 0.0;
            } else {
                offset[axis] = min;
                scale[axis] = 1.0 / (max - min);
            }
        }

        Self {
            samples,
            values: kept_values,
            offset,
            scale,
            config,
        }
    }

    /// Number of usable samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no usable sample was supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    fn normalized_dist_sq(&self, row: &[f64; 3], query: &[f64; 3]) -> f64 {
        let mut d2 = 0.0;
        for axis in 0..3 {
            let d = (row[axis] - self.offset[axis]) * self.scale[axis]
                - (query[axis] - self.offset[axis]) * self.scale[axis];
            d2 += d * d;
        }
        d2
    }
}

impl SpatialInterpolator for InverseDistanceInterpolator {
    fn evaluate(&self, lon: f64, lat: f64, time: f64) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }

        let query = [lon, lat, time];
        let half_power = self.config.power / 2.0;
        let mut weight_sum = 0.0;
        let mut value_sum = 0.0;

        for (row, &value) in self.samples.iter().zip(&self.values) {
            let d2 = self.normalized_dist_sq(row, &query);
            if d2 < self.config.exact_eps {
                return value;
            }
            let weight = d2.powf(-half_power);
            weight_sum += weight;
            value_sum += weight * value;
        }

        value_sum / weight_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(coords: &[[f64; 3]], values: &[f64]) -> InverseDistanceInterpolator {
        InverseDistanceInterpolator::new(coords, values, IdwConfig::default())
    }

    #[test]
    fn test_empty_returns_nan() {
        let interp = build(&[], &[]);
        assert!(interp.evaluate(0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_single_sample_is_constant() {
        let interp = build(&[[8.5, 49.1, 100.0]], &[5.0]);
        assert_eq!(interp.evaluate(8.5, 49.1, 100.0), 5.0);
        assert_eq!(interp.evaluate(0.0, 0.0, 0.0), 5.0);
        assert_eq!(interp.evaluate(100.0, -30.0, 1e9), 5.0);
    }

    #[test]
    fn test_exact_hit_returns_stored_value() {
        let coords = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 3600.0],
        ];
        let values = [10.0, 20.0, 30.0, 40.0];
        let interp = build(&coords, &values);
        for (row, &value) in coords.iter().zip(&values) {
            assert_eq!(interp.evaluate(row[0], row[1], row[2]), value);
        }
    }

    #[test]
    fn test_interpolated_value_bounded_by_samples() {
        let coords = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let values = [10.0, 20.0];
        let interp = build(&coords, &values);
        let mid = interp.evaluate(1.0, 0.0, 0.0);
        assert!(mid > 10.0 && mid < 20.0);
        // Symmetric by construction.
        assert!((mid - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_nan_samples_are_skipped() {
        let coords = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let values = [f64::NAN, 20.0];
        let interp = build(&coords, &values);
        assert_eq!(interp.len(), 1);
        assert_eq!(interp.evaluate(1.0, 0.0, 0.0), 20.0);
    }
}
