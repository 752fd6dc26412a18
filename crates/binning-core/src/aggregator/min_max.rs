//! Minimum/maximum aggregator.

use binning_common::{Observation, Result, VariableContext};

/// Tracks the running minimum and maximum of one variable.
///
/// Accumulators are seeded with the (+∞, −∞) sentinels; an accumulator
/// that never saw an observation still holds them at output time, and the
/// output stage replaces them with the fill value so they cannot leak
/// into a product undetected.
#[derive(Debug, Clone)]
pub struct MinMax {
    var_index: usize,
    fill_value: f32,
    names: Vec<String>,
}

impl MinMax {
    /// Create a min/max aggregator for a named variable.
    pub fn new(ctx: &VariableContext, var_name: &str, fill_value: Option<f32>) -> Result<Self> {
        let var_index = ctx.variable_index(var_name)?;
        Ok(Self {
            var_index,
            fill_value: fill_value.unwrap_or(f32::NAN),
            names: vec![format!("{}_min", var_name), format!("{}_max", var_name)],
        })
    }

    /// Property names, identical for the spatial, temporal, and output
    /// vectors.
    pub fn property_names(&self) -> &[String] {
        &self.names
    }

    pub fn fill_value(&self) -> f32 {
        self.fill_value
    }

    /// Seed an accumulator with the (+∞, −∞) sentinels.
    pub fn init(&self, vec: &mut [f32]) {
        vec[0] = f32::INFINITY;
        vec[1] = f32::NEG_INFINITY;
    }

    pub fn aggregate_spatial(&self, obs: &Observation, vec: &mut [f32]) {
        let x = obs.value(self.var_index);
        vec[0] = vec[0].min(x);
        vec[1] = vec[1].max(x);
    }

    pub fn aggregate_temporal(&self, spatial: &[f32], temporal: &mut [f32]) {
        temporal[0] = temporal[0].min(spatial[0]);
        temporal[1] = temporal[1].max(spatial[1]);
    }

    pub fn compute_output(&self, temporal: &[f32], output: &mut [f32]) {
        if temporal[0].is_finite() {
            output[0] = temporal[0];
            output[1] = temporal[1];
        } else {
            output[0] = self.fill_value;
            output[1] = self.fill_value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_max() -> MinMax {
        let ctx = VariableContext::from_names(&["a"]).unwrap();
        MinMax::new(&ctx, "a", None).unwrap()
    }

    fn obs(value: f32) -> Observation {
        Observation::new(0.0, 0.0, vec![value])
    }

    #[test]
    fn test_property_names() {
        let agg = min_max();
        assert_eq!(agg.property_names(), ["a_min", "a_max"]);
    }

    #[test]
    fn test_spatial_min_max() {
        let agg = min_max();
        let mut vec = [f32::NAN, f32::NAN];

        agg.init(&mut vec);
        assert_eq!(vec, [f32::INFINITY, f32::NEG_INFINITY]);

        for value in [7.3, 5.5, -0.1, 2.0] {
            agg.aggregate_spatial(&obs(value), &mut vec);
        }
        assert!((vec[0] - -0.1).abs() < 1e-5);
        assert!((vec[1] - 7.3).abs() < 1e-5);
    }

    #[test]
    fn test_temporal_running_min_max() {
        let agg = min_max();
        let mut tvec = [f32::NAN, f32::NAN];
        agg.init(&mut tvec);

        agg.aggregate_temporal(&[0.9, 1.0], &mut tvec);
        agg.aggregate_temporal(&[0.1, 5.1], &mut tvec);
        agg.aggregate_temporal(&[0.6, 2.0], &mut tvec);
        agg.aggregate_temporal(&[0.2, 1.5], &mut tvec);
        assert!((tvec[0] - 0.1).abs() < 1e-5);
        assert!((tvec[1] - 5.1).abs() < 1e-5);

        let mut out = [f32::NAN, f32::NAN];
        agg.compute_output(&tvec, &mut out);
        assert!((out[0] - 0.1).abs() < 1e-5);
        assert!((out[1] - 5.1).abs() < 1e-5);
    }

    #[test]
    fn test_untouched_sentinels_become_fill_value() {
        let ctx = VariableContext::from_names(&["a"]).unwrap();
        let agg = MinMax::new(&ctx, "a", Some(-1.0)).unwrap();
        let mut tvec = [f32::NAN, f32::NAN];
        agg.init(&mut tvec);

        // Zero observations: the sentinels survive accumulation...
        assert_eq!(tvec, [f32::INFINITY, f32::NEG_INFINITY]);

        // ...and must not reach the output.
        let mut out = [f32::NAN, f32::NAN];
        agg.compute_output(&tvec, &mut out);
        assert_eq!(out, [-1.0, -1.0]);
    }
}
