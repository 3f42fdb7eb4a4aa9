//! Statistical reducers.
//!
//! Each function is a pure, order-independent reduction over a sample set.
//! NaN inputs are skipped; an empty (or all-NaN) input reduces to NaN,
//! except `count`, which is 0.

use std::cmp::Ordering;
use std::fmt;

use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{ProcessError, Result};

/// A named statistical reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticalFunction {
    Count,
    Sum,
    Min,
    Max,
    Mean,
    Median,
    StdDev,
}

impl StatisticalFunction {
    /// All supported functions, in canonical order.
    pub const ALL: [StatisticalFunction; 7] = [
        Self::Count,
        Self::Sum,
        Self::Min,
        Self::Max,
        Self::Mean,
        Self::Median,
        Self::StdDev,
    ];

    /// Resolve a function by its lowercase name.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "count" => Ok(Self::Count),
            "sum" => Ok(Self::Sum),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "mean" | "avg" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "stddev" | "std_dev" | "sd" => Ok(Self::StdDev),
            other => Err(ProcessError::UnknownFunction(other.to_string())),
        }
    }

    /// Resolve a comma-or-list of names in request order.
    pub fn parse_list(names: &[&str]) -> Result<Vec<Self>> {
        names.iter().map(|name| Self::parse(name)).collect()
    }

    /// The canonical name, as used in `{variable}_{function}` output keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::StdDev => "stddev",
        }
    }

    /// Reduce a sample set. Pure and independent of input order.
    pub fn reduce<T: Float + FromPrimitive>(&self, values: &[T]) -> T {
        let valid: Vec<T> = values.iter().copied().filter(|v| !v.is_nan()).collect();

        if let Self::Count = self {
            return T::from_usize(valid.len()).unwrap_or_else(T::nan);
        }
        if valid.is_empty() {
            return T::nan();
        }

        match self {
            Self::Count => unreachable!("handled above"),
            Self::Sum => sum(&valid),
            Self::Min => valid.iter().copied().fold(T::infinity(), T::min),
            Self::Max => valid.iter().copied().fold(T::neg_infinity(), T::max),
            Self::Mean => mean(&valid),
            Self::Median => median(valid),
            Self::StdDev => std_dev(&valid),
        }
    }
}

impl fmt::Display for StatisticalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn sum<T: Float>(values: &[T]) -> T {
    values.iter().copied().fold(T::zero(), |acc, v| acc + v)
}

fn mean<T: Float + FromPrimitive>(values: &[T]) -> T {
    sum(values) / T::from_usize(values.len()).unwrap_or_else(T::one)
}

fn median<T: Float>(mut values: Vec<T>) -> T {
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / (T::one() + T::one())
    }
}

/// Sample standard deviation (n − 1 denominator); NaN below two samples.
fn std_dev<T: Float + FromPrimitive>(values: &[T]) -> T {
    if values.len() < 2 {
        return T::nan();
    }
    let mean = mean(values);
    let sum_sq = values
        .iter()
        .map(|&v| (v - mean) * (v - mean))
        .fold(T::zero(), |acc, v| acc + v);
    let denom = T::from_usize(values.len() - 1).unwrap_or_else(T::one);
    (sum_sq / denom).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 5] = [4.0, 1.0, 3.0, 2.0, 5.0];

    #[test]
    fn test_reductions() {
        assert_eq!(StatisticalFunction::Count.reduce(&SAMPLES), 5.0);
        assert_eq!(StatisticalFunction::Sum.reduce(&SAMPLES), 15.0);
        assert_eq!(StatisticalFunction::Min.reduce(&SAMPLES), 1.0);
        assert_eq!(StatisticalFunction::Max.reduce(&SAMPLES), 5.0);
        assert_eq!(StatisticalFunction::Mean.reduce(&SAMPLES), 3.0);
        assert_eq!(StatisticalFunction::Median.reduce(&SAMPLES), 3.0);
        let sd = StatisticalFunction::StdDev.reduce(&SAMPLES);
        assert!((sd - 1.5811).abs() < 1e-4);
    }

    #[test]
    fn test_even_median_averages_middles() {
        assert_eq!(StatisticalFunction::Median.reduce(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_nan_values_are_skipped() {
        let values = [1.0, f64::NAN, 3.0];
        assert_eq!(StatisticalFunction::Count.reduce(&values), 2.0);
        assert_eq!(StatisticalFunction::Mean.reduce(&values), 2.0);
    }

    #[test]
    fn test_empty_input() {
        let empty: [f64; 0] = [];
        assert_eq!(StatisticalFunction::Count.reduce(&empty), 0.0);
        assert!(StatisticalFunction::Mean.reduce(&empty).is_nan());
        assert!(StatisticalFunction::Min.reduce(&empty).is_nan());
    }

    #[test]
    fn test_order_independence() {
        let mut shuffled = SAMPLES;
        shuffled.reverse();
        for function in StatisticalFunction::ALL {
            let a = function.reduce(&SAMPLES);
            let b = function.reduce(&shuffled);
            assert!((a - b).abs() < 1e-12 || (a.is_nan() && b.is_nan()));
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(StatisticalFunction::parse("mean").unwrap(), StatisticalFunction::Mean);
        assert_eq!(StatisticalFunction::parse("MEAN").unwrap(), StatisticalFunction::Mean);
        assert_eq!(
            StatisticalFunction::parse("stddev").unwrap(),
            StatisticalFunction::StdDev
        );
        assert!(matches!(
            StatisticalFunction::parse("mode"),
            Err(ProcessError::UnknownFunction(_))
        ));

        let list = StatisticalFunction::parse_list(&["min", "max"]).unwrap();
        assert_eq!(list, vec![StatisticalFunction::Min, StatisticalFunction::Max]);
    }

    #[test]
    fn test_single_sample_stddev_is_undefined() {
        assert!(StatisticalFunction::StdDev.reduce(&[5.0]).is_nan());
    }
}
