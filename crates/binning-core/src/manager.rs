//! Bin lifecycle management and feature-vector layout.

use tracing::debug;

use binning_common::{BinningError, Observation, Result, VariableContext};

use crate::aggregator::Aggregator;
use crate::bins::{SpatialBin, TemporalBin};
use crate::registry::{create_aggregator, AggregatorConfig};

/// Owns the variable context and the ordered aggregator list, and drives
/// the bin lifecycle.
///
/// The offset tables for the spatial, temporal, and output vectors are
/// computed once at construction; each aggregator call receives only its
/// own contiguous sub-slice of a bin's feature vector.
#[derive(Debug, Clone)]
pub struct BinManager {
    ctx: VariableContext,
    aggregators: Vec<Aggregator>,
    spatial_offsets: Vec<usize>,
    temporal_offsets: Vec<usize>,
    output_offsets: Vec<usize>,
    spatial_len: usize,
    temporal_len: usize,
    output_len: usize,
}

impl BinManager {
    /// Build a manager from a variable context and aggregator
    /// configurations.
    ///
    /// Fails with a configuration error if the list is empty, a kind is
    /// unrecognized, or a referenced variable is undefined.
    pub fn new(ctx: VariableContext, configs: &[AggregatorConfig]) -> Result<Self> {
        if configs.is_empty() {
            return Err(BinningError::NoAggregators);
        }
        let aggregators = configs
            .iter()
            .map(|config| create_aggregator(&ctx, config))
            .collect::<Result<Vec<_>>>()?;

        let mut spatial_offsets = Vec::with_capacity(aggregators.len());
        let mut temporal_offsets = Vec::with_capacity(aggregators.len());
        let mut output_offsets = Vec::with_capacity(aggregators.len());
        let mut spatial_len = 0;
        let mut temporal_len = 0;
        let mut output_len = 0;
        for agg in &aggregators {
            spatial_offsets.push(spatial_len);
            temporal_offsets.push(temporal_len);
            output_offsets.push(output_len);
            spatial_len += agg.spatial_property_count();
            temporal_len += agg.temporal_property_count();
            output_len += agg.output_property_count();
        }

        debug!(
            aggregators = aggregators.len(),
            spatial_len, temporal_len, output_len, "computed feature vector layout"
        );

        Ok(Self {
            ctx,
            aggregators,
            spatial_offsets,
            temporal_offsets,
            output_offsets,
            spatial_len,
            temporal_len,
            output_len,
        })
    }

    /// The variable context aggregators resolve against.
    pub fn variable_context(&self) -> &VariableContext {
        &self.ctx
    }

    /// The configured aggregators, in order.
    pub fn aggregators(&self) -> &[Aggregator] {
        &self.aggregators
    }

    /// Length of a spatial feature vector.
    pub fn spatial_feature_len(&self) -> usize {
        self.spatial_len
    }

    /// Length of a temporal feature vector.
    pub fn temporal_feature_len(&self) -> usize {
        self.temporal_len
    }

    /// Length of an output vector.
    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// All spatial property names, flattened in aggregator order.
    pub fn spatial_property_names(&self) -> Vec<String> {
        self.aggregators
            .iter()
            .flat_map(|a| a.spatial_property_names().iter().cloned())
            .collect()
    }

    /// All temporal property names, flattened in aggregator order.
    pub fn temporal_property_names(&self) -> Vec<String> {
        self.aggregators
            .iter()
            .flat_map(|a| a.temporal_property_names().iter().cloned())
            .collect()
    }

    /// All output property names, flattened in aggregator order.
    pub fn output_property_names(&self) -> Vec<String> {
        self.aggregators
            .iter()
            .flat_map(|a| a.output_property_names().iter().cloned())
            .collect()
    }

    /// Per-property output fill values, flattened in aggregator order.
    pub fn output_fill_values(&self) -> Vec<f32> {
        self.aggregators
            .iter()
            .flat_map(|a| std::iter::repeat(a.fill_value()).take(a.output_property_count()))
            .collect()
    }

    /// Allocate and initialize a spatial bin for a grid index.
    pub fn create_spatial_bin(&self, index: usize) -> SpatialBin {
        let mut bin = SpatialBin::new(index, self.spatial_len);
        for (i, agg) in self.aggregators.iter().enumerate() {
            let start = self.spatial_offsets[i];
            agg.init_spatial(&mut bin.features[start..start + agg.spatial_property_count()]);
        }
        bin
    }

    /// Fold one observation into a spatial bin.
    pub fn aggregate_spatial_bin(&self, obs: &Observation, bin: &mut SpatialBin) -> Result<()> {
        if obs.len() != self.ctx.variable_count() {
            return Err(BinningError::ObservationArityMismatch {
                expected: self.ctx.variable_count(),
                actual: obs.len(),
            });
        }
        for (i, agg) in self.aggregators.iter().enumerate() {
            let start = self.spatial_offsets[i];
            agg.aggregate_spatial(obs, &mut bin.features[start..start + agg.spatial_property_count()]);
        }
        bin.num_obs += 1;
        Ok(())
    }

    /// Normalize a spatial bin once its slice's observations are
    /// exhausted.
    pub fn complete_spatial_bin(&self, bin: &mut SpatialBin) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let start = self.spatial_offsets[i];
            agg.complete_spatial(
                bin.num_obs,
                &mut bin.features[start..start + agg.spatial_property_count()],
            );
        }
    }

    /// Allocate and initialize a temporal bin for a grid index.
    pub fn create_temporal_bin(&self, index: usize) -> TemporalBin {
        let mut bin = TemporalBin::new(index, self.temporal_len);
        for (i, agg) in self.aggregators.iter().enumerate() {
            let start = self.temporal_offsets[i];
            agg.init_temporal(&mut bin.features[start..start + agg.temporal_property_count()]);
        }
        bin
    }

    /// Merge one completed spatial bin into a temporal bin.
    ///
    /// Increments the temporal bin's observation count by the spatial
    /// bin's count and its pass count by one.
    pub fn aggregate_temporal_bin(
        &self,
        spatial: &SpatialBin,
        temporal: &mut TemporalBin,
    ) -> Result<()> {
        if spatial.features.len() != self.spatial_len {
            return Err(BinningError::VectorLengthMismatch {
                bin_index: spatial.index,
                expected: self.spatial_len,
                actual: spatial.features.len(),
            });
        }
        for (i, agg) in self.aggregators.iter().enumerate() {
            let s_start = self.spatial_offsets[i];
            let t_start = self.temporal_offsets[i];
            agg.aggregate_temporal(
                &spatial.features[s_start..s_start + agg.spatial_property_count()],
                spatial.num_obs,
                &mut temporal.features[t_start..t_start + agg.temporal_property_count()],
            );
        }
        temporal.num_obs += spatial.num_obs;
        temporal.num_passes += 1;
        Ok(())
    }

    /// Final normalization of a temporal bin.
    pub fn complete_temporal_bin(&self, bin: &mut TemporalBin) {
        for (i, agg) in self.aggregators.iter().enumerate() {
            let start = self.temporal_offsets[i];
            agg.complete_temporal(
                bin.num_obs,
                &mut bin.features[start..start + agg.temporal_property_count()],
            );
        }
    }

    /// Compute the final output vector for a temporal bin.
    pub fn compute_output(&self, bin: &TemporalBin) -> Vec<f32> {
        let mut output = vec![0.0f32; self.output_len];
        for (i, agg) in self.aggregators.iter().enumerate() {
            let t_start = self.temporal_offsets[i];
            let o_start = self.output_offsets[i];
            agg.compute_output(
                &bin.features[t_start..t_start + agg.temporal_property_count()],
                &mut output[o_start..o_start + agg.output_property_count()],
            );
        }
        output
    }
}
