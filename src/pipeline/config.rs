//! Pipeline configuration.
//!
//! Every stage receives its file names and thresholds from a [`PipelineConfig`]; nothing is read
//! from globals. Configs can be loaded from JSON, where missing keys take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::processing::outliers::{OutlierFilter, DEFAULT_MULTIPLIER};
use crate::processing::stats::VarianceConvention;

/// File locations and tuning knobs shared by all stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Collect stage output, process stage input.
    pub raw_path: PathBuf,
    /// Process stage output, analyze stage input.
    pub sanitized_path: PathBuf,
    /// Analyze stage output.
    pub filtered_path: PathBuf,
    /// If set, the analyze report is also written here as JSON.
    pub report_path: Option<PathBuf>,
    /// Outlier fences sit at `mean ± outlier_multiplier * std_dev`.
    pub outlier_multiplier: f64,
    /// Divisor for the analyze-stage summary variance.
    pub variance_convention: VarianceConvention,
    /// How many leading/trailing values reports show.
    pub preview_len: usize,
    /// Input line (case-insensitive) that ends collection.
    pub stop_word: String,
    /// Column to read when an input file is CSV. `None` reads the first column.
    pub csv_column: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from("raw_values.txt"),
            sanitized_path: PathBuf::from("sanitized_values.txt"),
            filtered_path: PathBuf::from("filtered_values.txt"),
            report_path: None,
            outlier_multiplier: DEFAULT_MULTIPLIER,
            variance_convention: VarianceConvention::default(),
            preview_len: 5,
            stop_word: "end".to_string(),
            csv_column: None,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file and validate it.
    pub fn from_json_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> PipelineResult<()> {
        if !self.outlier_multiplier.is_finite() || self.outlier_multiplier < 0.0 {
            return Err(PipelineError::SchemaMismatch {
                message: format!(
                    "outlier_multiplier must be finite and >= 0 (got {})",
                    self.outlier_multiplier
                ),
            });
        }
        if self.stop_word.trim().is_empty() {
            return Err(PipelineError::SchemaMismatch {
                message: "stop_word must not be blank".to_string(),
            });
        }
        Ok(())
    }

    /// The outlier filter configured by [`Self::outlier_multiplier`].
    pub fn outlier_filter(&self) -> OutlierFilter {
        OutlierFilter::new(self.outlier_multiplier)
    }
}
