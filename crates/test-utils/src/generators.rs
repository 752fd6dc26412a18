//! Synthetic observation generators with predictable values.
//!
//! These generators create deterministic test data so aggregation
//! results can be asserted exactly, without fixture files.

use binning_common::{Observation, ObservationSlice, VariableContext};

/// Create a variable context from bare names, panicking on invalid input.
///
/// Test-only convenience over `VariableContext::from_names`.
pub fn variable_context(names: &[&str]) -> VariableContext {
    VariableContext::from_names(names).expect("valid test variable names")
}

/// Create a single observation.
pub fn obs(lat: f64, lon: f64, values: &[f32]) -> Observation {
    Observation::new(lat, lon, values.to_vec())
}

/// Create a slice holding one observation.
pub fn single_obs_slice(slice_index: usize, lat: f64, lon: f64, values: &[f32]) -> ObservationSlice {
    ObservationSlice::new(slice_index, vec![obs(lat, lon, values)])
}

/// Create a slice of `count` single-variable observations at one
/// location, all carrying the same value.
///
/// Useful for pinning observation counts and weight sums: the resulting
/// bin has `num_obs == count` and a mean equal to `value`.
pub fn constant_slice(
    slice_index: usize,
    count: usize,
    lat: f64,
    lon: f64,
    value: f32,
) -> ObservationSlice {
    let observations = (0..count).map(|_| obs(lat, lon, &[value])).collect();
    ObservationSlice::new(slice_index, observations)
}

/// Create single-variable observations on a regular lat/lon raster with
/// the value pattern `col * 1000 + row`.
///
/// Each cell value encodes its own position, so tests can verify which
/// observations landed in which bin. Positions run from the south-west
/// corner `(lat0, lon0)` in `step`-degree increments.
pub fn gradient_observations(
    width: usize,
    height: usize,
    lat0: f64,
    lon0: f64,
    step: f64,
) -> Vec<Observation> {
    let mut observations = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            observations.push(obs(
                lat0 + row as f64 * step,
                lon0 + col as f64 * step,
                &[(col * 1000 + row) as f32],
            ));
        }
    }
    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_slice() {
        let slice = constant_slice(2, 5, 10.0, 20.0, 1.5);
        assert_eq!(slice.index, 2);
        assert_eq!(slice.len(), 5);
        for obs in &slice.observations {
            assert_eq!(obs.lat, 10.0);
            assert_eq!(obs.lon, 20.0);
            assert_eq!(obs.values, [1.5]);
        }
    }

    #[test]
    fn test_gradient_observations_pattern() {
        let observations = gradient_observations(3, 2, -10.0, 5.0, 0.5);
        assert_eq!(observations.len(), 6);
        // value = col * 1000 + row
        assert_eq!(observations[0].values, [0.0]);
        assert_eq!(observations[1].values, [1000.0]);
        assert_eq!(observations[3].values, [1.0]);
        // positions advance from the south-west corner
        assert_eq!(observations[0].lat, -10.0);
        assert_eq!(observations[0].lon, 5.0);
        assert_eq!(observations[5].lat, -9.5);
        assert_eq!(observations[5].lon, 6.0);
    }
}
