//! Output table and job summary writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use binning_core::{BinManager, OutputRecord};
use binning_grid::SinusoidalGrid;

/// Write the finalized bin table as CSV.
///
/// Columns: `bin,lat,lon,num_obs,num_passes` followed by the flattened
/// output property names. Rows arrive ordered by bin index and are
/// written as-is.
pub fn write_output_csv(
    path: &Path,
    grid: &SinusoidalGrid,
    manager: &BinManager,
    records: &[OutputRecord],
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    write!(out, "bin,lat,lon,num_obs,num_passes")?;
    for name in manager.output_property_names() {
        write!(out, ",{}", name)?;
    }
    writeln!(out)?;

    for record in records {
        let (lat, lon) = grid.center_lat_lon(record.index);
        write!(
            out,
            "{},{},{},{},{}",
            record.index, lat, lon, record.num_obs, record.num_passes
        )?;
        for value in &record.values {
            write!(out, ",{}", value)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

/// Result summary of one binning job, written alongside the output
/// table.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    /// Unique job identifier.
    pub job_id: Uuid,
    /// Wall-clock start of the job.
    pub started: DateTime<Utc>,
    /// Wall-clock end of the job.
    pub finished: DateTime<Utc>,
    /// Aggregation period start, if configured.
    pub start_time: Option<DateTime<Utc>>,
    /// Aggregation period end, if configured.
    pub end_time: Option<DateTime<Utc>>,
    /// Grid rows used.
    pub num_rows: usize,
    /// Slices processed.
    pub num_slices: usize,
    /// Observations admitted into bins.
    pub num_observations: usize,
    /// Observations skipped for non-finite values plus malformed input
    /// rows.
    pub num_skipped: usize,
    /// Recoverable aggregation errors recorded during the run.
    pub num_errors: usize,
    /// Bins in the final product.
    pub num_bins: usize,
    /// Path of the output table.
    pub output: PathBuf,
}

/// Write the job summary as pretty-printed JSON.
pub fn write_summary(path: &Path, summary: &JobSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create summary file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .with_context(|| format!("failed to write summary file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use binning_common::VariableContext;
    use binning_core::AggregatorConfig;

    fn setup() -> (SinusoidalGrid, BinManager) {
        let grid = SinusoidalGrid::new(4).unwrap();
        let ctx = VariableContext::from_names(&["chl"]).unwrap();
        let manager = BinManager::new(ctx, &[AggregatorConfig::new("AVG", "chl")]).unwrap();
        (grid, manager)
    }

    #[test]
    fn test_write_output_csv() {
        let (grid, manager) = setup();
        let records = vec![OutputRecord {
            index: 2,
            num_obs: 5,
            num_passes: 2,
            values: vec![1.25, 0.5],
        }];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_output_csv(&path, &grid, &manager, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "bin,lat,lon,num_obs,num_passes,chl_mean,chl_sigma"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("2,-67.5,"));
        assert!(row.ends_with(",5,2,1.25,0.5"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_summary_round_trips_as_json() {
        let summary = JobSummary {
            job_id: Uuid::nil(),
            started: Utc::now(),
            finished: Utc::now(),
            start_time: None,
            end_time: None,
            num_rows: 2160,
            num_slices: 3,
            num_observations: 1200,
            num_skipped: 4,
            num_errors: 0,
            num_bins: 87,
            output: PathBuf::from("out.csv"),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.summary.json");
        write_summary(&path, &summary).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["num_bins"], 87);
        assert_eq!(value["num_rows"], 2160);
    }
}
