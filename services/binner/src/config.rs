//! Binning job configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use binning_common::VariableConfig;
use binning_core::AggregatorConfig;
use binning_grid::DEFAULT_NUM_ROWS;

fn default_num_rows() -> usize {
    DEFAULT_NUM_ROWS
}

/// Top-level binning job configuration, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Number of grid rows (even, >= 2). The default gives a ~4 km
    /// global grid.
    #[serde(default = "default_num_rows")]
    pub num_rows: usize,

    /// Validity mask expression, carried for the observation reader.
    #[serde(default)]
    pub mask_expr: Option<String>,

    /// Ordered per-pixel variables; CSV columns are matched by name.
    pub variables: Vec<VariableConfig>,

    /// Aggregators to run over the variables.
    pub aggregators: Vec<AggregatorConfig>,

    /// Aggregation period start (product metadata only).
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    /// Aggregation period end (product metadata only).
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// Explicit slice input files, processed in the given order.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,

    /// Directory scanned recursively for `.csv` slice files, sorted by
    /// path and appended after `inputs`.
    #[serde(default)]
    pub input_dir: Option<PathBuf>,

    /// Output CSV path.
    pub output: PathBuf,
}

impl JobConfig {
    /// Load a job configuration from a YAML file.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: JobConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration before any data is read.
    ///
    /// The engine performs the same checks at construction; validating
    /// here turns them into a clean startup failure instead of a
    /// mid-job one.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.num_rows < 2 || self.num_rows % 2 != 0 {
            return Err(format!("num_rows must be even and >= 2, got {}", self.num_rows));
        }

        if self.variables.is_empty() {
            return Err("at least one variable must be configured".to_string());
        }

        if self.aggregators.is_empty() {
            return Err("at least one aggregator must be configured".to_string());
        }

        for agg in &self.aggregators {
            let known = |name: &str| self.variables.iter().any(|v| v.name == name);
            if !known(&agg.var_name) {
                return Err(format!(
                    "aggregator '{}' references undefined variable '{}'",
                    agg.kind, agg.var_name
                ));
            }
            for companion in &agg.companion_names {
                if !known(companion) {
                    return Err(format!(
                        "aggregator '{}' references undefined companion variable '{}'",
                        agg.kind, companion
                    ));
                }
            }
        }

        if self.inputs.is_empty() && self.input_dir.is_none() {
            return Err("either inputs or input_dir must be set".to_string());
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err("end_time precedes start_time".to_string());
            }
        }

        Ok(())
    }

    /// Resolve the full, ordered list of slice input files.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut files = self.inputs.clone();

        if let Some(dir) = &self.input_dir {
            let mut scanned = Vec::new();
            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("failed to scan input dir {}", dir.display()))?;
                if entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "csv")
                {
                    scanned.push(entry.path().to_path_buf());
                }
            }
            scanned.sort();
            files.extend(scanned);
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal_yaml() -> &'static str {
        r#"
num_rows: 96
variables:
  - name: chl
aggregators:
  - kind: AVG
    var_name: chl
inputs:
  - slice0.csv
output: out.csv
"#
    }

    #[test]
    fn test_parse_minimal_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(minimal_yaml().as_bytes()).unwrap();

        let config = JobConfig::from_yaml(file.path()).unwrap();
        assert_eq!(config.num_rows, 96);
        assert_eq!(config.variables.len(), 1);
        assert_eq!(config.aggregators[0].kind, "AVG");
        assert!(config.mask_expr.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_num_rows_defaults_to_4km_grid() {
        let yaml = r#"
variables:
  - name: chl
aggregators:
  - kind: AVG
    var_name: chl
inputs: [a.csv]
output: out.csv
"#;
        let config: JobConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.num_rows, DEFAULT_NUM_ROWS);
    }

    #[test]
    fn test_validate_rejects_odd_rows() {
        let mut config: JobConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.num_rows = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_variable_reference() {
        let mut config: JobConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.aggregators[0].var_name = "sst".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("undefined variable 'sst'"));
    }

    #[test]
    fn test_validate_requires_inputs() {
        let mut config: JobConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.inputs.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_inputs_scans_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "lat,lon,chl\n").unwrap();
        }

        let mut config: JobConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.inputs.clear();
        config.input_dir = Some(dir.path().to_path_buf());

        let files = config.resolve_inputs().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.csv", "b.csv"]);
    }
}
