//! Two-phase binning pipeline.
//!
//! The spatial phase consumes observation slices independently: each
//! slice owns a private bin map, so any number of slices can be
//! processed concurrently with no shared mutable state. The temporal
//! phase is the single serialization point, merging completed spatial
//! bins into a persistent [`BinStore`] one slice at a time.
//!
//! # Architecture
//!
//! ```text
//! ObservationSlice ──► SpatialBinner::process_slice   (parallel, share-nothing)
//!                              │
//!                              ▼
//!                        SliceResult ──► TemporalBinner::consume_slice   (serial)
//!                                               │
//!                                               ▼
//!                                           BinStore ──► finalize_all ──► OutputRecords
//! ```
//!
//! Because temporal accumulation is associative and commutative
//! (see `binning-core`), slice processing order never affects the final
//! products.

pub mod driver;
pub mod spatial;
pub mod store;
pub mod temporal;

// Re-export commonly used types at crate root
pub use driver::{BinningPipeline, PipelineSummary};
pub use spatial::{SliceConsumer, SliceResult, SpatialBinner};
pub use store::{BinStore, MemoryBinStore};
pub use temporal::TemporalBinner;
