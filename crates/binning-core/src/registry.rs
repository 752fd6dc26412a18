//! Static aggregator registry and configuration.
//!
//! Aggregator kinds are a closed enumeration: the registry maps a kind
//! identifier to a constructor, and every name (kind and variables) is
//! resolved once at configuration time. An unknown kind or an undefined
//! variable is a configuration error raised before any data is touched,
//! never during aggregation.

use serde::{Deserialize, Serialize};

use binning_common::{BinningError, Result, VariableContext};

use crate::aggregator::{Aggregator, Average, AverageMl, MinMax, OnMaxSet};

/// Configuration for one aggregator instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Aggregator kind identifier: "AVG", "AVG_ML", "MIN_MAX", or
    /// "ON_MAX_SET" (case-insensitive).
    pub kind: String,
    /// The variable the aggregator operates on.
    pub var_name: String,
    /// Companion variables captured by ON_MAX_SET.
    #[serde(default)]
    pub companion_names: Vec<String>,
    /// Exponent of the temporal weight function `w(n) = n^coeff`.
    /// Defaults to 0.5.
    #[serde(default)]
    pub weight_coeff: Option<f64>,
    /// Value written where an output is undefined. Defaults to NaN.
    #[serde(default)]
    pub fill_value: Option<f32>,
}

impl AggregatorConfig {
    /// Create a configuration with defaults for the optional parameters.
    pub fn new(kind: impl Into<String>, var_name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            var_name: var_name.into(),
            companion_names: Vec::new(),
            weight_coeff: None,
            fill_value: None,
        }
    }

    /// Set the weight coefficient.
    pub fn with_weight_coeff(mut self, coeff: f64) -> Self {
        self.weight_coeff = Some(coeff);
        self
    }

    /// Set the companion variables (ON_MAX_SET only).
    pub fn with_companions(mut self, names: &[&str]) -> Self {
        self.companion_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Set the output fill value.
    pub fn with_fill_value(mut self, fill_value: f32) -> Self {
        self.fill_value = Some(fill_value);
        self
    }
}

type Constructor = fn(&VariableContext, &AggregatorConfig) -> Result<Aggregator>;

/// The closed set of aggregator kinds.
const REGISTRY: &[(&str, Constructor)] = &[
    ("AVG", |ctx, cfg| {
        Ok(Aggregator::Average(Average::new(
            ctx,
            &cfg.var_name,
            cfg.weight_coeff,
            cfg.fill_value,
        )?))
    }),
    ("AVG_ML", |ctx, cfg| {
        Ok(Aggregator::AverageMl(AverageMl::new(
            ctx,
            &cfg.var_name,
            cfg.weight_coeff,
            cfg.fill_value,
        )?))
    }),
    ("MIN_MAX", |ctx, cfg| {
        Ok(Aggregator::MinMax(MinMax::new(
            ctx,
            &cfg.var_name,
            cfg.fill_value,
        )?))
    }),
    ("ON_MAX_SET", |ctx, cfg| {
        Ok(Aggregator::OnMaxSet(OnMaxSet::new(
            ctx,
            &cfg.var_name,
            &cfg.companion_names,
            cfg.fill_value,
        )?))
    }),
];

/// Resolve a configuration into an aggregator instance.
///
/// Returns [`BinningError::UnknownAggregator`] for an unrecognized kind
/// and [`BinningError::UndefinedVariable`] for a variable name missing
/// from the context.
pub fn create_aggregator(ctx: &VariableContext, config: &AggregatorConfig) -> Result<Aggregator> {
    let kind = config.kind.to_uppercase();
    let constructor = REGISTRY
        .iter()
        .find(|(name, _)| *name == kind)
        .map(|(_, constructor)| constructor)
        .ok_or_else(|| BinningError::UnknownAggregator(config.kind.clone()))?;
    constructor(ctx, config)
}

/// The identifiers of all registered aggregator kinds.
pub fn known_kinds() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}
