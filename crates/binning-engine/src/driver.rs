//! Parallel slice driver for the two-phase pipeline.

use rayon::prelude::*;
use tracing::info;

use binning_common::ObservationSlice;
use binning_core::BinManager;
use binning_grid::SinusoidalGrid;

use crate::spatial::{SliceConsumer, SpatialBinner};
use crate::store::BinStore;
use crate::temporal::TemporalBinner;

/// Totals accumulated over one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSummary {
    /// Number of slices processed.
    pub num_slices: usize,
    /// Observations admitted into spatial bins.
    pub num_observations: usize,
    /// Observations skipped for non-finite position or values.
    pub num_skipped: usize,
    /// Recoverable errors recorded across both phases.
    pub num_errors: usize,
    /// Spatial bins emitted by all slices.
    pub num_spatial_bins: usize,
    /// Temporal bins in the store after the run.
    pub num_temporal_bins: usize,
}

/// Drives observation slices through the spatial phase in parallel and
/// merges the results into a temporal store.
///
/// Spatial work is share-nothing, so slices fan out across the rayon
/// pool. The temporal merge runs on the calling thread: it is the one
/// serialization point of the pipeline, and keeping it single-threaded
/// satisfies the store's read-modify-write exclusion requirement without
/// any locking. Results are merged in slice order for reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct BinningPipeline<'a> {
    grid: &'a SinusoidalGrid,
    manager: &'a BinManager,
}

impl<'a> BinningPipeline<'a> {
    /// Create a pipeline over a grid and bin manager.
    pub fn new(grid: &'a SinusoidalGrid, manager: &'a BinManager) -> Self {
        Self { grid, manager }
    }

    /// Process all slices and merge them into the given temporal binner.
    pub fn run<S: BinStore>(
        &self,
        slices: &[ObservationSlice],
        temporal: &mut TemporalBinner<'_, S>,
    ) -> PipelineSummary {
        let spatial = SpatialBinner::new(self.grid, self.manager);

        let mut results: Vec<_> = slices
            .par_iter()
            .map(|slice| spatial.process_slice(slice.index, &slice.observations))
            .collect();
        results.sort_unstable_by_key(|result| result.slice_index);

        let mut summary = PipelineSummary {
            num_slices: results.len(),
            ..PipelineSummary::default()
        };
        for result in results {
            summary.num_observations += result.num_observations;
            summary.num_skipped += result.num_skipped;
            summary.num_errors += result.errors.len();
            summary.num_spatial_bins += result.bins.len();
            temporal.consume_slice(result);
        }
        summary.num_errors += temporal.errors().len();
        summary.num_temporal_bins = temporal.store().len();

        info!(
            num_slices = summary.num_slices,
            num_observations = summary.num_observations,
            num_skipped = summary.num_skipped,
            num_errors = summary.num_errors,
            num_temporal_bins = summary.num_temporal_bins,
            "binning pipeline run complete"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBinStore;
    use binning_common::{Observation, VariableContext};
    use binning_core::AggregatorConfig;

    fn setup() -> (SinusoidalGrid, BinManager) {
        let grid = SinusoidalGrid::new(8).unwrap();
        let ctx = VariableContext::from_names(&["chl"]).unwrap();
        let manager = BinManager::new(ctx, &[AggregatorConfig::new("AVG", "chl")]).unwrap();
        (grid, manager)
    }

    #[test]
    fn test_run_accumulates_summary() {
        let (grid, manager) = setup();
        let pipeline = BinningPipeline::new(&grid, &manager);

        let slices = vec![
            ObservationSlice::new(
                0,
                vec![
                    Observation::new(10.0, 10.0, vec![1.0]),
                    Observation::new(10.0, 10.0, vec![2.0]),
                    Observation::new(f64::NAN, 10.0, vec![3.0]),
                ],
            ),
            ObservationSlice::new(1, vec![Observation::new(10.0, 10.0, vec![3.0])]),
        ];

        let mut temporal = TemporalBinner::new(&manager, MemoryBinStore::new());
        let summary = pipeline.run(&slices, &mut temporal);

        assert_eq!(summary.num_slices, 2);
        assert_eq!(summary.num_observations, 3);
        assert_eq!(summary.num_skipped, 1);
        assert_eq!(summary.num_errors, 0);
        assert_eq!(summary.num_spatial_bins, 2);
        assert_eq!(summary.num_temporal_bins, 1);

        let bin = temporal
            .store()
            .get(grid.bin_index(10.0, 10.0))
            .unwrap();
        assert_eq!(bin.num_obs, 3);
        assert_eq!(bin.num_passes, 2);
    }
}
