//! Error types for the binning workspace.

use thiserror::Error;

/// Result type for binning operations.
pub type Result<T> = std::result::Result<T, BinningError>;

/// Errors raised by the binning engine.
///
/// Configuration errors are surfaced eagerly at construction time and are
/// fatal to that configuration attempt. Aggregation errors are recorded in
/// the per-slice exception list and never abort a slice. Bad observation
/// values (non-finite lat/lon or values) are not errors at all; they are
/// counted and skipped.
#[derive(Debug, Clone, Error)]
pub enum BinningError {
    // === Configuration Errors ===
    #[error("invalid number of grid rows {0}: must be even and >= 2")]
    InvalidNumRows(usize),

    #[error("unknown aggregator kind: {0}")]
    UnknownAggregator(String),

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("duplicate variable: {0}")]
    DuplicateVariable(String),

    #[error("aggregator '{kind}' is missing required parameter '{param}'")]
    MissingParameter { kind: String, param: String },

    #[error("no aggregators configured")]
    NoAggregators,

    // === Aggregation Errors ===
    #[error("observation carries {actual} values, variable context defines {expected}")]
    ObservationArityMismatch { expected: usize, actual: usize },

    #[error("bin {bin_index} feature vector has {actual} properties, expected {expected}")]
    VectorLengthMismatch {
        bin_index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("aggregation failed for bin {bin_index}: {message}")]
    Aggregation { bin_index: usize, message: String },
}

impl BinningError {
    /// Whether this error belongs to the configuration taxonomy.
    ///
    /// Configuration errors propagate to the caller immediately; everything
    /// else is accumulated alongside partial results.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BinningError::InvalidNumRows(_)
                | BinningError::UnknownAggregator(_)
                | BinningError::UndefinedVariable(_)
                | BinningError::DuplicateVariable(_)
                | BinningError::MissingParameter { .. }
                | BinningError::NoAggregators
        )
    }
}
