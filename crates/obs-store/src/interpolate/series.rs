//! Cubic interpolation for single-station time series.

use super::SeriesInterpolator;

/// Catmull-Rom cubic interpolator over an irregular 1-D time series.
///
/// Knots are sorted at construction; a duplicate time keeps the first value
/// seen. Queries below the first knot or above the last clamp to the nearest
/// stored sample, an exact knot hit returns the stored value with no
/// arithmetic, and a series with a single knot is a constant. Endpoint
/// segments duplicate the boundary knot, the usual Catmull-Rom treatment.
pub struct CubicSeriesInterpolator {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl CubicSeriesInterpolator {
    /// Build from parallel time/value slices, skipping NaN values.
    pub fn new(times: &[f64], values: &[f64]) -> Self {
        let mut knots: Vec<(f64, f64)> = times
            .iter()
            .zip(values)
            .filter(|(_, v)| !v.is_nan())
            .map(|(&t, &v)| (t, v))
            .collect();
        knots.sort_by(|a, b| a.0.total_cmp(&b.0));
        knots.dedup_by(|next, first| next.0 == first.0);

        Self {
            times: knots.iter().map(|&(t, _)| t).collect(),
            values: knots.iter().map(|&(_, v)| v).collect(),
        }
    }

    /// Number of usable knots.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True when no usable knot was supplied.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl SeriesInterpolator for CubicSeriesInterpolator {
    fn evaluate(&self, time: f64) -> f64 {
        let n = self.times.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return self.values[0];
        }
        // Out-of-range queries clamp to the nearest stored sample.
        if time <= self.times[0] {
            return self.values[0];
        }
        if time >= self.times[n - 1] {
            return self.values[n - 1];
        }

        let seg = match self.times.binary_search_by(|t| t.total_cmp(&time)) {
            Ok(exact) => return self.values[exact],
            Err(upper) => upper - 1,
        };

        let t0 = self.times[seg];
        let t1 = self.times[seg + 1];
        let u = ((time - t0) / (t1 - t0)) as f32;

        let p1 = self.values[seg] as f32;
        let p2 = self.values[seg + 1] as f32;
        let p0 = if seg > 0 {
            self.values[seg - 1] as f32
        } else {
            p1
        };
        let p3 = if seg + 2 < n {
            self.values[seg + 2] as f32
        } else {
            p2
        };

        cubic_1d(p0, p1, p2, p3, u) as f64
    }
}

/// 1D cubic interpolation using Catmull-Rom spline.
fn cubic_1d(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    // Catmull-Rom coefficients
    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}
