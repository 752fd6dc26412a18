//! Arithmetic average aggregator.

use binning_common::{Observation, Result, VariableContext};

use super::{WeightFn, DEFAULT_WEIGHT_COEFF};

/// Accumulates the arithmetic mean and standard deviation of one
/// variable.
///
/// Spatial state is (Σx, Σx²), normalized to the per-bin means at slice
/// completion. Temporal state accumulates the weighted means
/// (Σw·x̄, Σw·x̄², Σw) with `w = num_obs^coeff`, which keeps the merge
/// associative and commutative regardless of slice partitioning.
#[derive(Debug, Clone)]
pub struct Average {
    var_index: usize,
    weight_fn: WeightFn,
    fill_value: f32,
    spatial_names: Vec<String>,
    temporal_names: Vec<String>,
    output_names: Vec<String>,
}

impl Average {
    /// Create an average aggregator for a named variable.
    pub fn new(
        ctx: &VariableContext,
        var_name: &str,
        weight_coeff: Option<f64>,
        fill_value: Option<f32>,
    ) -> Result<Self> {
        let var_index = ctx.variable_index(var_name)?;
        Ok(Self {
            var_index,
            weight_fn: WeightFn::new(weight_coeff.unwrap_or(DEFAULT_WEIGHT_COEFF)),
            fill_value: fill_value.unwrap_or(f32::NAN),
            spatial_names: vec![
                format!("{}_sum_x", var_name),
                format!("{}_sum_xx", var_name),
            ],
            temporal_names: vec![
                format!("{}_sum_x", var_name),
                format!("{}_sum_xx", var_name),
                format!("{}_sum_w", var_name),
            ],
            output_names: vec![format!("{}_mean", var_name), format!("{}_sigma", var_name)],
        })
    }

    pub fn spatial_property_names(&self) -> &[String] {
        &self.spatial_names
    }

    pub fn temporal_property_names(&self) -> &[String] {
        &self.temporal_names
    }

    pub fn output_property_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn fill_value(&self) -> f32 {
        self.fill_value
    }

    pub fn init_spatial(&self, vec: &mut [f32]) {
        vec[0] = 0.0;
        vec[1] = 0.0;
    }

    pub fn aggregate_spatial(&self, obs: &Observation, vec: &mut [f32]) {
        let x = obs.value(self.var_index);
        vec[0] += x;
        vec[1] += x * x;
    }

    /// Normalize the sums to per-bin means.
    pub fn complete_spatial(&self, num_obs: u32, vec: &mut [f32]) {
        let n = num_obs as f32;
        vec[0] /= n;
        vec[1] /= n;
    }

    pub fn init_temporal(&self, vec: &mut [f32]) {
        vec[0] = 0.0;
        vec[1] = 0.0;
        vec[2] = 0.0;
    }

    pub fn aggregate_temporal(&self, spatial: &[f32], num_spatial_obs: u32, temporal: &mut [f32]) {
        let w = self.weight_fn.eval(num_spatial_obs);
        temporal[0] += w * spatial[0];
        temporal[1] += w * spatial[1];
        temporal[2] += w;
    }

    pub fn compute_output(&self, temporal: &[f32], output: &mut [f32]) {
        let sum_x = temporal[0];
        let sum_xx = temporal[1];
        let sum_w = temporal[2];
        if sum_w > 0.0 {
            let mean = sum_x / sum_w;
            let sigma = (sum_xx / sum_w - mean * mean).max(0.0).sqrt();
            output[0] = mean;
            output[1] = sigma;
        } else {
            output[0] = self.fill_value;
            output[1] = self.fill_value;
        }
    }
}
