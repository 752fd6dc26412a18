//! On-max-set aggregator.

use binning_common::{Observation, Result, VariableContext};

/// Tracks the maximum of a primary variable and captures companion
/// variable values from the observation achieving it.
///
/// Typical use: "the chlorophyll value and view angle at the time of peak
/// fluorescence". The comparison is strictly greater-than, so when two
/// observations tie on the primary variable the companions of the first
/// one seen are kept.
#[derive(Debug, Clone)]
pub struct OnMaxSet {
    on_index: usize,
    set_indices: Vec<usize>,
    fill_value: f32,
    names: Vec<String>,
}

impl OnMaxSet {
    /// Create an on-max-set aggregator with a primary variable and any
    /// number of companion variables.
    pub fn new(
        ctx: &VariableContext,
        on_name: &str,
        set_names: &[String],
        fill_value: Option<f32>,
    ) -> Result<Self> {
        let on_index = ctx.variable_index(on_name)?;
        let mut set_indices = Vec::with_capacity(set_names.len());
        let mut names = Vec::with_capacity(set_names.len() + 1);
        names.push(format!("{}_max", on_name));
        for name in set_names {
            set_indices.push(ctx.variable_index(name)?);
            names.push(name.clone());
        }
        Ok(Self {
            on_index,
            set_indices,
            fill_value: fill_value.unwrap_or(f32::NAN),
            names,
        })
    }

    /// Property names, identical for the spatial, temporal, and output
    /// vectors: the primary maximum followed by the companions.
    pub fn property_names(&self) -> &[String] {
        &self.names
    }

    pub fn fill_value(&self) -> f32 {
        self.fill_value
    }

    /// Seed an accumulator: −∞ for the maximum, NaN for the companions.
    pub fn init(&self, vec: &mut [f32]) {
        vec[0] = f32::NEG_INFINITY;
        vec[1..].fill(f32::NAN);
    }

    pub fn aggregate_spatial(&self, obs: &Observation, vec: &mut [f32]) {
        let value = obs.value(self.on_index);
        if value > vec[0] {
            vec[0] = value;
            for (slot, &index) in self.set_indices.iter().enumerate() {
                vec[slot + 1] = obs.value(index);
            }
        }
    }

    pub fn aggregate_temporal(&self, spatial: &[f32], temporal: &mut [f32]) {
        if spatial[0] > temporal[0] {
            temporal.copy_from_slice(spatial);
        }
    }

    pub fn compute_output(&self, temporal: &[f32], output: &mut [f32]) {
        if temporal[0].is_finite() {
            output.copy_from_slice(temporal);
        } else {
            output.fill(self.fill_value);
        }
    }
}
