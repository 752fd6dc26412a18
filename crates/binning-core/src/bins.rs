//! Bin types produced by the two binning phases.

use serde::{Deserialize, Serialize};

/// Partial aggregate of observations from one processing slice, scoped to
/// one grid cell.
///
/// Created lazily when the first observation of a slice maps to the cell;
/// never merges observations across slices. The feature vector length
/// equals the sum of all aggregators' spatial-property counts, in
/// aggregator order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialBin {
    /// Grid bin index.
    pub index: usize,
    /// Number of observations aggregated into this bin.
    pub num_obs: u32,
    /// Flat spatial accumulator state, one sub-slice per aggregator.
    pub features: Vec<f32>,
}

impl SpatialBin {
    /// Create a bin with a pre-sized feature vector.
    pub fn new(index: usize, feature_len: usize) -> Self {
        Self {
            index,
            num_obs: 0,
            features: vec![0.0; feature_len],
        }
    }
}

/// Persistent aggregate merging spatial bins across slices and passes for
/// one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalBin {
    /// Grid bin index.
    pub index: usize,
    /// Total observation count across all merged spatial bins.
    pub num_obs: u32,
    /// Number of spatial bins merged in.
    pub num_passes: u32,
    /// Flat temporal accumulator state, one sub-slice per aggregator.
    pub features: Vec<f32>,
}

impl TemporalBin {
    /// Create a bin with a pre-sized feature vector.
    pub fn new(index: usize, feature_len: usize) -> Self {
        Self {
            index,
            num_obs: 0,
            num_passes: 0,
            features: vec![0.0; feature_len],
        }
    }
}

/// Finalized per-bin statistics, produced on demand from a temporal bin
/// and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Grid bin index.
    pub index: usize,
    /// Total observation count.
    pub num_obs: u32,
    /// Number of spatial bins merged in.
    pub num_passes: u32,
    /// Output property values, one sub-slice per aggregator.
    pub values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bins_are_zeroed() {
        let spatial = SpatialBin::new(17, 4);
        assert_eq!(spatial.index, 17);
        assert_eq!(spatial.num_obs, 0);
        assert_eq!(spatial.features, [0.0, 0.0, 0.0, 0.0]);

        let temporal = TemporalBin::new(17, 5);
        assert_eq!(temporal.num_obs, 0);
        assert_eq!(temporal.num_passes, 0);
        assert_eq!(temporal.features.len(), 5);
    }

    #[test]
    fn test_spatial_bin_serde_round_trip() {
        let bin = SpatialBin {
            index: 42,
            num_obs: 3,
            features: vec![1.5, 2.25],
        };
        let json = serde_json::to_string(&bin).unwrap();
        let back: SpatialBin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bin);
    }
}
