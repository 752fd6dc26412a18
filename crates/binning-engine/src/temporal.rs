//! Temporal merging of completed spatial bins.

use tracing::debug;

use binning_common::BinningError;
use binning_core::{BinManager, OutputRecord, TemporalBin};

use crate::spatial::{SliceConsumer, SliceResult};
use crate::store::BinStore;

/// Merges completed spatial bins into persistent temporal bins.
///
/// This is the pipeline's serialization point: each delivered slice is
/// folded into the store with a get-or-create / aggregate / put cycle
/// per spatial bin. Slices may arrive in any order, from one or many
/// producers; the result is the same because temporal accumulation is
/// associative and commutative.
pub struct TemporalBinner<'a, S: BinStore> {
    manager: &'a BinManager,
    store: S,
    slices_consumed: usize,
    errors: Vec<BinningError>,
}

impl<'a, S: BinStore> TemporalBinner<'a, S> {
    /// Create a binner over a manager and a bin store.
    pub fn new(manager: &'a BinManager, store: S) -> Self {
        Self {
            manager,
            store,
            slices_consumed: 0,
            errors: Vec::new(),
        }
    }

    /// The underlying bin store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the binner and return the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Number of slices merged so far.
    pub fn slices_consumed(&self) -> usize {
        self.slices_consumed
    }

    /// Recoverable errors recorded during temporal merging.
    pub fn errors(&self) -> &[BinningError] {
        &self.errors
    }

    /// Produce the finalized output record for one temporal bin.
    ///
    /// Works on a completed copy; the stored bin is never mutated.
    pub fn finalize(&self, bin: &TemporalBin) -> OutputRecord {
        let mut completed = bin.clone();
        self.manager.complete_temporal_bin(&mut completed);
        OutputRecord {
            index: completed.index,
            num_obs: completed.num_obs,
            num_passes: completed.num_passes,
            values: self.manager.compute_output(&completed),
        }
    }

    /// Finalize every stored bin, ordered by bin index.
    pub fn finalize_all(&self) -> Vec<OutputRecord> {
        self.store
            .sorted_indices()
            .into_iter()
            .filter_map(|index| self.store.get(index))
            .map(|bin| self.finalize(&bin))
            .collect()
    }
}

impl<S: BinStore> SliceConsumer for TemporalBinner<'_, S> {
    fn consume_slice(&mut self, result: SliceResult) {
        for spatial_bin in &result.bins {
            let mut temporal_bin = self
                .store
                .get(spatial_bin.index)
                .unwrap_or_else(|| self.manager.create_temporal_bin(spatial_bin.index));
            match self.manager.aggregate_temporal_bin(spatial_bin, &mut temporal_bin) {
                Ok(()) => self.store.put(temporal_bin),
                Err(err) => self.errors.push(err),
            }
        }
        self.slices_consumed += 1;
        debug!(
            slice_index = result.slice_index,
            bins = result.bins.len(),
            stored = self.store.len(),
            "merged spatial slice into temporal store"
        );
    }
}
