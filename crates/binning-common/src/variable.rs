//! Variable registry shared by aggregators and observation readers.

use serde::{Deserialize, Serialize};

use crate::error::{BinningError, Result};

/// Configuration for one named per-pixel variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableConfig {
    /// Variable name, referenced by aggregator configurations.
    pub name: String,
    /// Optional band-arithmetic expression evaluated by the observation
    /// reader (opaque to the binning engine).
    #[serde(default)]
    pub expr: Option<String>,
}

impl VariableConfig {
    /// Create a plain named variable without an expression.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: None,
        }
    }
}

/// Ordered registry of named variables plus a validity mask expression.
///
/// Aggregators resolve variable names to indices against this context at
/// configuration time and use the indices to read observation value
/// vectors during aggregation. The mask expression is carried verbatim for
/// the external reader that evaluates observation validity; the engine
/// never interprets it. Immutable once built.
#[derive(Debug, Clone)]
pub struct VariableContext {
    names: Vec<String>,
    exprs: Vec<Option<String>>,
    mask_expr: Option<String>,
}

impl VariableContext {
    /// Build a context from variable configurations and an optional mask
    /// expression.
    ///
    /// Fails with [`BinningError::DuplicateVariable`] if two variables
    /// share a name.
    pub fn new(variables: &[VariableConfig], mask_expr: Option<String>) -> Result<Self> {
        let mut names = Vec::with_capacity(variables.len());
        let mut exprs = Vec::with_capacity(variables.len());
        for var in variables {
            if names.contains(&var.name) {
                return Err(BinningError::DuplicateVariable(var.name.clone()));
            }
            names.push(var.name.clone());
            exprs.push(var.expr.clone());
        }
        Ok(Self {
            names,
            exprs,
            mask_expr,
        })
    }

    /// Build a context from bare variable names (no expressions, no mask).
    pub fn from_names(names: &[&str]) -> Result<Self> {
        let variables: Vec<VariableConfig> =
            names.iter().map(|n| VariableConfig::named(*n)).collect();
        Self::new(&variables, None)
    }

    /// Number of registered variables.
    pub fn variable_count(&self) -> usize {
        self.names.len()
    }

    /// Resolve a variable name to its index in observation value vectors.
    pub fn variable_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| BinningError::UndefinedVariable(name.to_string()))
    }

    /// Get the name of the variable at an index.
    pub fn variable_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Get the expression attached to the variable at an index, if any.
    pub fn variable_expr(&self, index: usize) -> Option<&str> {
        self.exprs.get(index).and_then(|e| e.as_deref())
    }

    /// The validity mask expression, if configured.
    pub fn mask_expr(&self) -> Option<&str> {
        self.mask_expr.as_deref()
    }

    /// All variable names in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
