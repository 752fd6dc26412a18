//! Spatial binning of observation slices.

use std::collections::HashMap;

use tracing::debug;

use binning_common::{BinningError, Observation};
use binning_core::{BinManager, SpatialBin};
use binning_grid::SinusoidalGrid;

/// Completed result of spatially binning one observation slice.
#[derive(Debug, Clone)]
pub struct SliceResult {
    /// Identifier of the processed slice.
    pub slice_index: usize,
    /// Completed spatial bins, sorted by bin index.
    pub bins: Vec<SpatialBin>,
    /// Observations admitted into bins.
    pub num_observations: usize,
    /// Observations skipped for non-finite position or values.
    pub num_skipped: usize,
    /// Recoverable errors recorded while processing the slice.
    pub errors: Vec<BinningError>,
}

/// Consumer of completed slice results, the hand-off point between the
/// spatial and temporal phases.
pub trait SliceConsumer {
    /// Accept one completed slice.
    fn consume_slice(&mut self, result: SliceResult);
}

/// Bins the observations of one slice into slice-local spatial bins.
///
/// A slice is processed in isolation: bins live in a private map, are
/// completed when the slice's observations are exhausted, and are emitted
/// exactly once. A spatial bin therefore never spans two slices, which
/// preserves the per-slice observation counts the temporal weight
/// function depends on.
#[derive(Debug, Clone, Copy)]
pub struct SpatialBinner<'a> {
    grid: &'a SinusoidalGrid,
    manager: &'a BinManager,
}

impl<'a> SpatialBinner<'a> {
    /// Create a binner over a grid and bin manager.
    pub fn new(grid: &'a SinusoidalGrid, manager: &'a BinManager) -> Self {
        Self { grid, manager }
    }

    /// Process one observation slice to completion.
    ///
    /// Invalid observations are skipped and counted; recoverable
    /// per-observation failures are recorded in the result's error list
    /// and processing continues. The slice is always emitted with
    /// whatever bins completed successfully.
    pub fn process_slice(&self, slice_index: usize, observations: &[Observation]) -> SliceResult {
        let mut bins: HashMap<usize, SpatialBin> = HashMap::new();
        let mut num_observations = 0usize;
        let mut num_skipped = 0usize;
        let mut errors = Vec::new();

        for obs in observations {
            if !obs.is_finite() {
                num_skipped += 1;
                continue;
            }
            let index = self.grid.bin_index(obs.lat, obs.lon);
            let bin = bins
                .entry(index)
                .or_insert_with(|| self.manager.create_spatial_bin(index));
            match self.manager.aggregate_spatial_bin(obs, bin) {
                Ok(()) => num_observations += 1,
                Err(err) => errors.push(err),
            }
        }

        // Bins created but never successfully aggregated into would hit
        // completion with a zero count; drop them alongside their
        // recorded errors.
        bins.retain(|_, bin| bin.num_obs > 0);

        let mut completed: Vec<SpatialBin> = bins.into_values().collect();
        completed.sort_unstable_by_key(|bin| bin.index);
        for bin in &mut completed {
            self.manager.complete_spatial_bin(bin);
        }

        debug!(
            slice_index,
            bins = completed.len(),
            num_observations,
            num_skipped,
            errors = errors.len(),
            "completed spatial slice"
        );

        SliceResult {
            slice_index,
            bins: completed,
            num_observations,
            num_skipped,
            errors,
        }
    }
}
