//! Level-3 binning batch service.
//!
//! Reads a YAML job configuration and one CSV observation file per
//! slice, runs the two-phase binning pipeline (spatial in parallel,
//! temporal merge serialized), and writes the finalized bin table as CSV
//! plus a JSON job summary.

mod config;
mod reader;
mod writer;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use binning_common::VariableContext;
use binning_core::BinManager;
use binning_engine::{BinningPipeline, MemoryBinStore, TemporalBinner};
use binning_grid::SinusoidalGrid;

use config::JobConfig;

#[derive(Parser, Debug)]
#[command(name = "binner")]
#[command(about = "Level-3 binning of satellite pixel observations")]
struct Args {
    /// Job configuration file path
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let job_id = Uuid::new_v4();
    let started = Utc::now();
    info!(%job_id, config = %args.config.display(), "starting binning job");

    // Load and validate configuration; any problem here is fatal before
    // data is touched.
    let config = JobConfig::from_yaml(&args.config)?;
    config
        .validate()
        .map_err(|msg| anyhow!("invalid job configuration: {}", msg))?;

    let ctx = VariableContext::new(&config.variables, config.mask_expr.clone())?;
    let grid = SinusoidalGrid::new(config.num_rows)?;
    let manager = BinManager::new(ctx, &config.aggregators)?;
    info!(
        num_rows = grid.num_rows(),
        total_bins = grid.total_bins(),
        aggregators = manager.aggregators().len(),
        "configured binning engine"
    );

    // Read observation slices, one file per slice.
    let input_files = config.resolve_inputs()?;
    if input_files.is_empty() {
        bail!("no input slice files found");
    }

    let mut slices = Vec::with_capacity(input_files.len());
    let mut num_malformed = 0usize;
    for (slice_index, path) in input_files.iter().enumerate() {
        let read = reader::read_slice(path, slice_index, manager.variable_context())?;
        num_malformed += read.num_malformed;
        slices.push(read.slice);
    }
    info!(slices = slices.len(), "loaded observation slices");

    // Run the pipeline.
    let pipeline = BinningPipeline::new(&grid, &manager);
    let mut temporal = TemporalBinner::new(&manager, MemoryBinStore::new());
    let summary = pipeline.run(&slices, &mut temporal);

    if summary.num_skipped + num_malformed > 0 {
        warn!(
            skipped_observations = summary.num_skipped,
            malformed_rows = num_malformed,
            "job completed with skipped input data"
        );
    }
    if summary.num_errors > 0 {
        warn!(
            num_errors = summary.num_errors,
            "job completed with recorded aggregation errors; partial results written"
        );
    }

    // Write outputs.
    let records = temporal.finalize_all();
    let output_path = args.output.unwrap_or_else(|| config.output.clone());
    writer::write_output_csv(&output_path, &grid, &manager, &records)?;

    let job_summary = writer::JobSummary {
        job_id,
        started,
        finished: Utc::now(),
        start_time: config.start_time,
        end_time: config.end_time,
        num_rows: config.num_rows,
        num_slices: summary.num_slices,
        num_observations: summary.num_observations,
        num_skipped: summary.num_skipped + num_malformed,
        num_errors: summary.num_errors,
        num_bins: records.len(),
        output: output_path.clone(),
    };
    writer::write_summary(&output_path.with_extension("summary.json"), &job_summary)?;

    info!(
        bins = records.len(),
        output = %output_path.display(),
        "binning job complete"
    );
    Ok(())
}
