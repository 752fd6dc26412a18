//! Maximum-likelihood average aggregator.

use binning_common::{Observation, Result, VariableContext};

use super::{WeightFn, DEFAULT_WEIGHT_COEFF};

/// Accumulates a maximum-likelihood average in the log domain, for
/// variables that are approximately log-normally distributed (e.g.
/// chlorophyll concentration).
///
/// Spatial state is (Σln x, Σln²x), scaled by 1/w at spatial completion.
/// Temporal state adds the completed spatial values unweighted and
/// accumulates Σw. Output reconstructs mean, sigma, median, and mode of
/// the log-normal distribution.
#[derive(Debug, Clone)]
pub struct AverageMl {
    var_index: usize,
    weight_fn: WeightFn,
    fill_value: f32,
    spatial_names: Vec<String>,
    temporal_names: Vec<String>,
    output_names: Vec<String>,
}

impl AverageMl {
    /// Create a maximum-likelihood average aggregator for a named
    /// variable.
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
            output_names: vec![
                format!("{}_mean", var_name),
                format!("{}_sigma", var_name),
                format!("{}_median", var_name),
                format!("{}_mode", var_name),
            ],
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
        let x = (obs.value(self.var_index) as f64).ln() as f32;
        vec[0] += x;
        vec[1] += x * x;
    }

    /// Scale the log sums by 1/w, so the temporal stage can add completed
    /// spatial contributions directly.
    pub fn complete_spatial(&self, num_obs: u32, vec: &mut [f32]) {
        let w = self.weight_fn.eval(num_obs);
        vec[0] /= w;
        vec[1] /= w;
    }

    pub fn init_temporal(&self, vec: &mut [f32]) {
        vec[0] = 0.0;
        vec[1] = 0.0;
        vec[2] = 0.0;
    }

    pub fn aggregate_temporal(&self, spatial: &[f32], num_spatial_obs: u32, temporal: &mut [f32]) {
        temporal[0] += spatial[0];
        temporal[1] += spatial[1];
        temporal[2] += self.weight_fn.eval(num_spatial_obs);
    }

    pub fn compute_output(&self, temporal: &[f32], output: &mut [f32]) {
        let sum_x = temporal[0];
        let sum_xx = temporal[1];
        let sum_w = temporal[2];
        if sum_w > 0.0 {
            let av_logs = (sum_x / sum_w) as f64;
            let vr_logs = (sum_xx / sum_w) as f64 - av_logs * av_logs;
            let mean = (av_logs + 0.5 * vr_logs).exp();
            let sigma = mean * (vr_logs.exp() - 1.0).max(0.0).sqrt();
            output[0] = mean as f32;
            output[1] = sigma as f32;
            output[2] = av_logs.exp() as f32;
            output[3] = (av_logs - vr_logs).exp() as f32;
        } else {
            output[..4].fill(self.fill_value);
        }
    }
}
