//! CSV observation slice reader.
//!
//! One file per slice. The header names the columns; `lat` and `lon` are
//! required, every configured variable must have a matching column, and
//! extra columns are ignored. The format is plain comma-separated values
//! without quoting, the way upstream extraction jobs emit pixel tables.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;

use binning_common::{Observation, ObservationSlice, VariableContext};

/// One parsed slice file plus its data-error count.
#[derive(Debug)]
pub struct SliceReadResult {
    /// The parsed observation slice.
    pub slice: ObservationSlice,
    /// Rows dropped for wrong field counts or unparsable numbers.
    pub num_malformed: usize,
}

/// Read one observation slice from a CSV file.
///
/// Malformed rows are data errors: counted and skipped, never fatal. A
/// missing required column is a configuration problem and fails the
/// whole read.
pub fn read_slice(path: &Path, slice_index: usize, ctx: &VariableContext) -> Result<SliceReadResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read slice file {}", path.display()))?;

    let mut lines = text.lines();
    let header = match lines.next() {
        Some(line) => line,
        None => bail!("slice file {} is empty", path.display()),
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    let position = |name: &str| -> Result<usize> {
        columns
            .iter()
            .position(|c| *c == name)
            .with_context(|| format!("slice file {} has no '{}' column", path.display(), name))
    };
    let lat_col = position("lat")?;
    let lon_col = position("lon")?;
    let var_cols: Vec<usize> = ctx
        .names()
        .iter()
        .map(|name| position(name))
        .collect::<Result<_>>()?;

    let mut observations = Vec::new();
    let mut num_malformed = 0usize;
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match parse_row(&fields, lat_col, lon_col, &var_cols) {
            Some(obs) => observations.push(obs),
            None => num_malformed += 1,
        }
    }

    if num_malformed > 0 {
        warn!(
            file = %path.display(),
            num_malformed,
            "dropped malformed rows from slice file"
        );
    }

    Ok(SliceReadResult {
        slice: ObservationSlice::new(slice_index, observations),
        num_malformed,
    })
}

fn parse_row(
    fields: &[&str],
    lat_col: usize,
    lon_col: usize,
    var_cols: &[usize],
) -> Option<Observation> {
    let lat: f64 = fields.get(lat_col)?.parse().ok()?;
    let lon: f64 = fields.get(lon_col)?.parse().ok()?;
    let mut values = Vec::with_capacity(var_cols.len());
    for &col in var_cols {
        values.push(fields.get(col)?.parse().ok()?);
    }
    Some(Observation::new(lat, lon, values))
}
