//! Integration tests for the two-phase binning pipeline.

use binning_common::ObservationSlice;
use binning_core::{AggregatorConfig, BinManager};
use binning_engine::{
    BinStore, BinningPipeline, MemoryBinStore, SliceConsumer, SpatialBinner, TemporalBinner,
};
use binning_grid::SinusoidalGrid;
use test_utils::{assert_approx_eq, constant_slice, obs, variable_context};

fn chl_manager() -> BinManager {
    BinManager::new(
        variable_context(&["chl"]),
        &[AggregatorConfig::new("AVG", "chl")],
    )
    .unwrap()
}

#[test]
fn two_slices_same_bin_accumulate_counts_passes_and_weights() {
    let grid = SinusoidalGrid::new(4).unwrap();
    let manager = chl_manager();
    let pipeline = BinningPipeline::new(&grid, &manager);

    // Bin index 2: row 0 (lat -67.5 band), third column.
    let (lat, lon) = grid.center_lat_lon(2);
    let slices = vec![
        constant_slice(0, 3, lat, lon, 1.0),
        constant_slice(1, 2, lat, lon, 2.0),
    ];

    let mut temporal = TemporalBinner::new(&manager, MemoryBinStore::new());
    let summary = pipeline.run(&slices, &mut temporal);
    assert_eq!(summary.num_spatial_bins, 2);
    assert_eq!(summary.num_temporal_bins, 1);

    let bin = temporal.store().get(2).unwrap();
    assert_eq!(bin.num_obs, 5);
    assert_eq!(bin.num_passes, 2);
    // Default weight coefficient 0.5: w = √3 + √2.
    assert_approx_eq!(bin.features[2], 3f64.sqrt() + 2f64.sqrt(), 1e-5);
}

#[test]
fn spatial_bins_never_span_slices() {
    let grid = SinusoidalGrid::new(4).unwrap();
    let manager = chl_manager();
    let spatial = SpatialBinner::new(&grid, &manager);

    let (lat, lon) = grid.center_lat_lon(2);
    let first = spatial.process_slice(0, &[obs(lat, lon, &[1.0]), obs(lat, lon, &[2.0])]);
    let second = spatial.process_slice(1, &[obs(lat, lon, &[3.0])]);

    // Each slice owns its bin for the same grid index.
    assert_eq!(first.bins.len(), 1);
    assert_eq!(second.bins.len(), 1);
    assert_eq!(first.bins[0].index, second.bins[0].index);
    assert_eq!(first.bins[0].num_obs, 2);
    assert_eq!(second.bins[0].num_obs, 1);
}

#[test]
fn parallel_and_sequential_runs_produce_identical_stores() {
    let grid = SinusoidalGrid::new(96).unwrap();
    let manager = BinManager::new(
        variable_context(&["chl"]),
        &[
            AggregatorConfig::new("AVG", "chl"),
            AggregatorConfig::new("MIN_MAX", "chl"),
        ],
    )
    .unwrap();

    // Many slices spread over the globe, several hitting the same bins.
    let mut slices = Vec::new();
    for i in 0..24usize {
        let lat = -80.0 + (i % 8) as f64 * 20.0;
        let lon = -170.0 + (i % 12) as f64 * 28.0;
        slices.push(constant_slice(i, 1 + i % 5, lat, lon, (i as f32) * 0.25 + 0.5));
    }

    // Parallel pipeline run.
    let pipeline = BinningPipeline::new(&grid, &manager);
    let mut parallel = TemporalBinner::new(&manager, MemoryBinStore::new());
    pipeline.run(&slices, &mut parallel);

    // Sequential reference: one slice at a time, reversed order.
    let spatial = SpatialBinner::new(&grid, &manager);
    let mut sequential = TemporalBinner::new(&manager, MemoryBinStore::new());
    for slice in slices.iter().rev() {
        let result = spatial.process_slice(slice.index, &slice.observations);
        sequential.consume_slice(result);
    }

    let parallel_records = parallel.finalize_all();
    let sequential_records = sequential.finalize_all();
    assert_eq!(parallel_records.len(), sequential_records.len());
    for (a, b) in parallel_records.iter().zip(&sequential_records) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.num_obs, b.num_obs);
        assert_eq!(a.num_passes, b.num_passes);
        for (x, y) in a.values.iter().zip(&b.values) {
            assert_approx_eq!(*x, *y, 1e-5);
        }
    }
}

#[test]
fn batched_and_partitioned_temporal_merges_agree() {
    let grid = SinusoidalGrid::new(4).unwrap();
    let manager = chl_manager();
    let pipeline = BinningPipeline::new(&grid, &manager);

    let (lat, lon) = grid.center_lat_lon(10);
    let slices: Vec<ObservationSlice> = vec![
        constant_slice(0, 3, lat, lon, 1.5),
        constant_slice(1, 2, lat, lon, 2.5),
        constant_slice(2, 7, lat, lon, 0.5),
        constant_slice(3, 1, lat, lon, 4.0),
    ];

    // All four slices in one run.
    let mut batched = TemporalBinner::new(&manager, MemoryBinStore::new());
    pipeline.run(&slices, &mut batched);

    // Two partitioned runs merged into the same store.
    let mut partitioned = TemporalBinner::new(&manager, MemoryBinStore::new());
    pipeline.run(&slices[..2], &mut partitioned);
    pipeline.run(&slices[2..], &mut partitioned);

    let a = batched.finalize_all();
    let b = partitioned.finalize_all();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert_eq!(a[0].num_obs, b[0].num_obs);
    assert_eq!(a[0].num_passes, b[0].num_passes);
    assert_approx_eq!(a[0].values[0], b[0].values[0], 1e-5);
    assert_approx_eq!(a[0].values[1], b[0].values[1], 1e-5);
}

#[test]
fn multi_aggregator_end_to_end() {
    let grid = SinusoidalGrid::new(8).unwrap();
    let ctx = variable_context(&["chl", "sst", "flh"]);
    let manager = BinManager::new(
        ctx,
        &[
            AggregatorConfig::new("AVG", "chl"),
            AggregatorConfig::new("MIN_MAX", "sst"),
            AggregatorConfig::new("ON_MAX_SET", "flh").with_companions(&["chl", "sst"]),
        ],
    )
    .unwrap();
    let pipeline = BinningPipeline::new(&grid, &manager);

    let (lat, lon) = grid.center_lat_lon(40);
    let slices = vec![
        ObservationSlice::new(
            0,
            vec![
                obs(lat, lon, &[1.0, 290.0, 0.2]),
                obs(lat, lon, &[2.0, 288.0, 0.7]),
            ],
        ),
        ObservationSlice::new(1, vec![obs(lat, lon, &[3.0, 285.0, 0.5])]),
    ];

    let mut temporal = TemporalBinner::new(&manager, MemoryBinStore::new());
    pipeline.run(&slices, &mut temporal);

    let records = temporal.finalize_all();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.index, 40);
    assert_eq!(record.num_obs, 3);
    assert_eq!(record.num_passes, 2);
    assert_eq!(
        record.values.len(),
        manager.output_property_names().len()
    );

    // Output layout: chl_mean, chl_sigma, sst_min, sst_max, flh_max, chl, sst.
    assert_approx_eq!(record.values[2], 285.0, 1e-4);
    assert_approx_eq!(record.values[3], 290.0, 1e-4);
    // flh peaks at 0.7 in slice 0; companions come from that observation.
    assert_approx_eq!(record.values[4], 0.7, 1e-5);
    assert_approx_eq!(record.values[5], 2.0, 1e-5);
    assert_approx_eq!(record.values[6], 288.0, 1e-4);
}

#[test]
fn skipped_and_errored_observations_reported_in_summary() {
    let grid = SinusoidalGrid::new(4).unwrap();
    let manager = chl_manager();
    let pipeline = BinningPipeline::new(&grid, &manager);

    let slices = vec![ObservationSlice::new(
        0,
        vec![
            obs(0.0, 0.0, &[1.0]),
            obs(f64::NAN, 0.0, &[1.0]),
            obs(0.0, 0.0, &[f32::NAN]),
            obs(0.0, 0.0, &[1.0, 2.0]),
            obs(0.0, 0.0, &[2.0]),
        ],
    )];

    let mut temporal = TemporalBinner::new(&manager, MemoryBinStore::new());
    let summary = pipeline.run(&slices, &mut temporal);

    assert_eq!(summary.num_observations, 2);
    assert_eq!(summary.num_skipped, 2);
    assert_eq!(summary.num_errors, 1);
    // Partial results remain usable.
    assert_eq!(summary.num_temporal_bins, 1);
    let bin = temporal.store().get(grid.bin_index(0.0, 0.0)).unwrap();
    assert_eq!(bin.num_obs, 2);
}
