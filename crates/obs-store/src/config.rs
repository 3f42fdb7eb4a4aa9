//! Tunable policies for ingestion and resampling.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Quantization policy for duplicate detection.
///
/// An incoming observation is a duplicate when its `(lon, lat, time,
/// variable)` tuple, quantized at these scales, matches one already stored.
/// The quantized tuple is hashed to a `u64` set key, so a hash collision is
/// admitted as a (spurious) duplicate; at the intended floating precision
/// that is an accepted approximation, not a correctness bug.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DedupPolicy {
    /// Multiplier applied to lon/lat before rounding (1e5 ≈ 1 m).
    pub coord_scale: f64,
    /// Multiplier applied to the epoch-seconds time scalar before rounding.
    pub time_scale: f64,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            coord_scale: 1e5,
            time_scale: 1e2,
        }
    }
}

impl DedupPolicy {
    /// Quantize one coordinate.
    #[inline]
    pub fn quantize_coord(&self, value: f64) -> i64 {
        (value * self.coord_scale).round() as i64
    }

    /// Quantize a time scalar.
    #[inline]
    pub fn quantize_time(&self, value: f64) -> i64 {
        (value * self.time_scale).round() as i64
    }

    /// Composite dedup key for an observation tuple.
    pub fn key(&self, lon: f64, lat: f64, time: f64, variable: u32) -> u64 {
        let mut hasher = DefaultHasher::new();
        (
            self.quantize_coord(lon),
            self.quantize_coord(lat),
            self.quantize_time(time),
            variable,
        )
            .hash(&mut hasher);
        hasher.finish()
    }

    /// Quantized spatial cell key, used to derive a station identity for
    /// observations that arrive without a station code.
    pub fn position_key(&self, lon: f64, lat: f64) -> String {
        format!("{}:{}", self.quantize_coord(lon), self.quantize_coord(lat))
    }
}

/// Defaults for grid resampling dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampleConfig {
    /// Grid width used when the query gives neither width nor height.
    pub default_width: usize,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self { default_width: 200 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_stable_under_rounding() {
        let policy = DedupPolicy::default();
        // Differences below the quantization step map to the same key.
        let a = policy.key(8.500001, 49.1, 1_700_000_000.0, 0);
        let b = policy.key(8.500001, 49.1, 1_700_000_000.004, 0);
        assert_eq!(a, b);

        // A different variable id is a different key.
        let c = policy.key(8.500001, 49.1, 1_700_000_000.0, 1);
        assert_ne!(a, c);
    }

    #[test]
    fn test_position_key_groups_nearby_points() {
        let policy = DedupPolicy::default();
        assert_eq!(
            policy.position_key(8.5000001, 49.1),
            policy.position_key(8.5000004, 49.1)
        );
        assert_ne!(policy.position_key(8.5, 49.1), policy.position_key(8.6, 49.1));
    }

    #[test]
    fn test_resample_defaults() {
        assert_eq!(ResampleConfig::default().default_width, 200);
    }
}
