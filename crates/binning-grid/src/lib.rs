//! Equal-area sinusoidal binning grid.
//!
//! Maps geographic coordinates onto the integerized sinusoidal grid used
//! for Level-3 binned products: rows of equal latitude height, each with a
//! cosine-weighted number of equal-width columns, so every cell covers
//! roughly the same area. Bins are identified by a single integer index.

pub mod sinusoidal;

pub use sinusoidal::{SinusoidalGrid, DEFAULT_NUM_ROWS};
