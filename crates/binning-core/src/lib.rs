//! Statistical aggregation framework for Level-3 binning.
//!
//! This crate provides the pluggable per-bin accumulation rules and the
//! machinery that drives them:
//!
//! - **Aggregators**: a closed family of statistical kinds (average,
//!   maximum-likelihood average, min/max, on-max-set), each defining its
//!   own spatial, temporal, and output property vectors
//! - **Registry**: static kind-name to constructor mapping, resolved once
//!   at configuration time
//! - **BinManager**: owns the aggregator list, computes the shared
//!   feature-vector layout, and exposes the bin lifecycle operations used
//!   by the binner stages
//!
//! # Architecture
//!
//! ```text
//! Observation ──► BinManager::aggregate_spatial_bin ──► SpatialBin
//!                        │  (per-aggregator sub-slices)
//!                        ▼
//!                 complete_spatial_bin
//!                        │
//!                        ▼
//!                 aggregate_temporal_bin ──► TemporalBin
//!                        │  (weighted by w(num_obs))
//!                        ▼
//!                 compute_output ──► output vector
//! ```
//!
//! Temporal accumulation is associative and commutative across
//! spatial-bin merges, so partitioned and sequential execution produce
//! the same results up to floating-point rounding.

pub mod aggregator;
pub mod bins;
pub mod manager;
pub mod registry;

// Re-export commonly used types at crate root
pub use aggregator::{Aggregator, WeightFn, DEFAULT_WEIGHT_COEFF};
pub use bins::{OutputRecord, SpatialBin, TemporalBin};
pub use manager::BinManager;
pub use registry::{create_aggregator, known_kinds, AggregatorConfig};
