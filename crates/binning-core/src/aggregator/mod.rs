//! The closed aggregator variant family.
//!
//! Each variant declares its spatial, temporal, and output property
//! vectors and implements the accumulation rules over caller-supplied
//! sub-slices of a bin's shared feature vector. Dispatch is a plain
//! `match`, so adding a kind means the compiler points at every place
//! that must handle it.

mod average;
mod average_ml;
mod min_max;
mod on_max_set;

pub use average::Average;
pub use average_ml::AverageMl;
pub use min_max::MinMax;
pub use on_max_set::OnMaxSet;

use binning_common::Observation;

/// Default exponent of the temporal weight function.
pub const DEFAULT_WEIGHT_COEFF: f64 = 0.5;

/// Weight function `w(n) = n^coeff` applied when a spatial bin's
/// contribution enters the temporal accumulation.
///
/// The common coefficients 0, 0.5, and 1 get exact fast paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightFn {
    /// coeff = 0: every spatial bin weighs 1.
    Unity,
    /// coeff = 0.5: weight is the square root of the observation count.
    Sqrt,
    /// coeff = 1: weight equals the observation count.
    Linear,
    /// Any other coefficient.
    Pow(f64),
}

impl WeightFn {
    /// Select the weight function for a coefficient.
    pub fn new(coeff: f64) -> Self {
        if coeff == 0.0 {
            WeightFn::Unity
        } else if coeff == 0.5 {
            WeightFn::Sqrt
        } else if coeff == 1.0 {
            WeightFn::Linear
        } else {
            WeightFn::Pow(coeff)
        }
    }

    /// Evaluate the weight for a spatial bin's observation count.
    pub fn eval(&self, num_obs: u32) -> f32 {
        match self {
            WeightFn::Unity => 1.0,
            WeightFn::Sqrt => (num_obs as f32).sqrt(),
            WeightFn::Linear => num_obs as f32,
            WeightFn::Pow(coeff) => (num_obs as f64).powf(*coeff) as f32,
        }
    }
}

/// A statistical accumulation rule over one bin.
///
/// All operations act on the aggregator's own contiguous sub-slice of the
/// bin's feature vector; the [`BinManager`](crate::BinManager) computes
/// the offsets and hands each aggregator only its view.
#[derive(Debug, Clone)]
pub enum Aggregator {
    /// Arithmetic mean and standard deviation.
    Average(Average),
    /// Maximum-likelihood average in the log domain.
    AverageMl(AverageMl),
    /// Running minimum and maximum.
    MinMax(MinMax),
    /// Maximum of a primary variable with companion values captured at
    /// the observation achieving it.
    OnMaxSet(OnMaxSet),
}

impl Aggregator {
    /// Short identifier of the aggregator kind.
    pub fn name(&self) -> &'static str {
        match self {
            Aggregator::Average(_) => "AVG",
            Aggregator::AverageMl(_) => "AVG_ML",
            Aggregator::MinMax(_) => "MIN_MAX",
            Aggregator::OnMaxSet(_) => "ON_MAX_SET",
        }
    }

    /// Names of the spatial accumulator properties.
    pub fn spatial_property_names(&self) -> &[String] {
        match self {
            Aggregator::Average(a) => a.spatial_property_names(),
            Aggregator::AverageMl(a) => a.spatial_property_names(),
            Aggregator::MinMax(a) => a.property_names(),
            Aggregator::OnMaxSet(a) => a.property_names(),
        }
    }

    /// Names of the temporal accumulator properties.
    pub fn temporal_property_names(&self) -> &[String] {
        match self {
            Aggregator::Average(a) => a.temporal_property_names(),
            Aggregator::AverageMl(a) => a.temporal_property_names(),
            Aggregator::MinMax(a) => a.property_names(),
            Aggregator::OnMaxSet(a) => a.property_names(),
        }
    }

    /// Names of the final output properties.
    pub fn output_property_names(&self) -> &[String] {
        match self {
            Aggregator::Average(a) => a.output_property_names(),
            Aggregator::AverageMl(a) => a.output_property_names(),
            Aggregator::MinMax(a) => a.property_names(),
            Aggregator::OnMaxSet(a) => a.property_names(),
        }
    }

    /// Number of spatial accumulator properties.
    pub fn spatial_property_count(&self) -> usize {
        self.spatial_property_names().len()
    }

    /// Number of temporal accumulator properties.
    pub fn temporal_property_count(&self) -> usize {
        self.temporal_property_names().len()
    }

    /// Number of output properties.
    pub fn output_property_count(&self) -> usize {
        self.output_property_names().len()
    }

    /// Value written where an output is undefined.
    pub fn fill_value(&self) -> f32 {
        match self {
            Aggregator::Average(a) => a.fill_value(),
            Aggregator::AverageMl(a) => a.fill_value(),
            Aggregator::MinMax(a) => a.fill_value(),
            Aggregator::OnMaxSet(a) => a.fill_value(),
        }
    }

    /// Initialize a spatial accumulator slice.
    pub fn init_spatial(&self, vec: &mut [f32]) {
        match self {
            Aggregator::Average(a) => a.init_spatial(vec),
            Aggregator::AverageMl(a) => a.init_spatial(vec),
            Aggregator::MinMax(a) => a.init(vec),
            Aggregator::OnMaxSet(a) => a.init(vec),
        }
    }

    /// Fold one admitted observation into a spatial accumulator.
    pub fn aggregate_spatial(&self, obs: &Observation, vec: &mut [f32]) {
        match self {
            Aggregator::Average(a) => a.aggregate_spatial(obs, vec),
            Aggregator::AverageMl(a) => a.aggregate_spatial(obs, vec),
            Aggregator::MinMax(a) => a.aggregate_spatial(obs, vec),
            Aggregator::OnMaxSet(a) => a.aggregate_spatial(obs, vec),
        }
    }

    /// Normalize a spatial accumulator once the slice's observations for
    /// the bin are exhausted.
    pub fn complete_spatial(&self, num_obs: u32, vec: &mut [f32]) {
        match self {
            Aggregator::Average(a) => a.complete_spatial(num_obs, vec),
            Aggregator::AverageMl(a) => a.complete_spatial(num_obs, vec),
            Aggregator::MinMax(_) | Aggregator::OnMaxSet(_) => {}
        }
    }

    /// Initialize a temporal accumulator slice.
    pub fn init_temporal(&self, vec: &mut [f32]) {
        match self {
            Aggregator::Average(a) => a.init_temporal(vec),
            Aggregator::AverageMl(a) => a.init_temporal(vec),
            Aggregator::MinMax(a) => a.init(vec),
            Aggregator::OnMaxSet(a) => a.init(vec),
        }
    }

    /// Merge one completed spatial accumulator into a temporal
    /// accumulator, weighted by the spatial bin's observation count.
    pub fn aggregate_temporal(&self, spatial: &[f32], num_spatial_obs: u32, temporal: &mut [f32]) {
        match self {
            Aggregator::Average(a) => a.aggregate_temporal(spatial, num_spatial_obs, temporal),
            Aggregator::AverageMl(a) => a.aggregate_temporal(spatial, num_spatial_obs, temporal),
            Aggregator::MinMax(a) => a.aggregate_temporal(spatial, temporal),
            Aggregator::OnMaxSet(a) => a.aggregate_temporal(spatial, temporal),
        }
    }

    /// Final normalization of a temporal accumulator. Identity for every
    /// current kind.
    pub fn complete_temporal(&self, _num_obs: u32, _vec: &mut [f32]) {}

    /// Produce the final reportable statistics from a temporal
    /// accumulator.
    pub fn compute_output(&self, temporal: &[f32], output: &mut [f32]) {
        match self {
            Aggregator::Average(a) => a.compute_output(temporal, output),
            Aggregator::AverageMl(a) => a.compute_output(temporal, output),
            Aggregator::MinMax(a) => a.compute_output(temporal, output),
            Aggregator::OnMaxSet(a) => a.compute_output(temporal, output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_fn_fast_paths() {
        assert_eq!(WeightFn::new(0.0), WeightFn::Unity);
        assert_eq!(WeightFn::new(0.5), WeightFn::Sqrt);
        assert_eq!(WeightFn::new(1.0), WeightFn::Linear);
        assert_eq!(WeightFn::new(0.75), WeightFn::Pow(0.75));
    }

    #[test]
    fn test_weight_fn_eval() {
        assert_eq!(WeightFn::Unity.eval(9), 1.0);
        assert!((WeightFn::Sqrt.eval(9) - 3.0).abs() < 1e-6);
        assert_eq!(WeightFn::Linear.eval(9), 9.0);
        assert!((WeightFn::Pow(2.0).eval(3) - 9.0).abs() < 1e-6);
        assert_eq!(WeightFn::Sqrt.eval(1), 1.0);
    }
}
