//! Unified sample loading.
//!
//! [`load_sample`] picks the reader from the file extension: `.csv` goes through
//! [`super::csv`], anything else (including no extension) is read as newline-delimited text.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;

use super::text::ParsedSample;
use super::{csv, text};

/// Supported sample file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// One integer per line.
    Text,
    /// Headered CSV; one column is read.
    Csv,
}

impl SampleFormat {
    /// Parse a format from a file extension (case-insensitive). Unknown extensions are text.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Self::Csv,
            _ => Self::Text,
        }
    }

    /// Infer the format of `path`.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|s| s.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Text)
    }
}

/// Load a sample from `path`, inferring the format.
///
/// `csv_column` only matters for CSV input; `None` selects the first column.
pub fn load_sample(
    path: impl AsRef<Path>,
    csv_column: Option<&str>,
) -> PipelineResult<ParsedSample> {
    let path = path.as_ref();
    match SampleFormat::from_path(path) {
        SampleFormat::Text => text::read_sample_file(path),
        SampleFormat::Csv => csv::read_sample_csv_from_path(path, csv_column),
    }
}
