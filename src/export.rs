//! Writing samples and reports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::ingestion::SampleFormat;
use crate::types::Sample;

/// Header written for CSV output when no column name is configured.
pub const DEFAULT_CSV_COLUMN: &str = "value";

/// What happened when a stage tried to persist its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveStatus {
    /// `count` values were written to `path`.
    Written { path: PathBuf, count: usize },
    /// The sample was empty; no file was touched.
    NothingToSave,
    /// The write failed. The in-memory result is still valid.
    Failed { path: PathBuf, message: String },
}

/// Write `sample` as decimal integers, one per line, each newline-terminated.
pub fn write_sample<W: Write>(mut writer: W, sample: &Sample) -> std::io::Result<()> {
    for v in sample {
        writeln!(writer, "{v}")?;
    }
    writer.flush()
}

/// Write `sample` as a one-column headered CSV.
pub fn write_sample_csv<W: Write>(writer: W, column: &str, sample: &Sample) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([column])?;
    for v in sample {
        wtr.write_record([v.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `sample` to `path` as newline-delimited text, replacing any existing file.
///
/// An empty sample is not written and yields [`SaveStatus::NothingToSave`].
pub fn write_sample_to_path(
    path: impl AsRef<Path>,
    sample: &Sample,
) -> PipelineResult<SaveStatus> {
    let path = path.as_ref();
    if sample.is_empty() {
        return Ok(SaveStatus::NothingToSave);
    }

    let to_write_err = |source: std::io::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_write_err)?;
    write_sample(BufWriter::new(file), sample).map_err(to_write_err)?;

    Ok(SaveStatus::Written {
        path: path.to_path_buf(),
        count: sample.len(),
    })
}

/// Write `sample` to `path` as a one-column CSV headed by `column`.
///
/// An empty sample is not written and yields [`SaveStatus::NothingToSave`].
pub fn write_sample_csv_to_path(
    path: impl AsRef<Path>,
    column: &str,
    sample: &Sample,
) -> PipelineResult<SaveStatus> {
    let path = path.as_ref();
    if sample.is_empty() {
        return Ok(SaveStatus::NothingToSave);
    }

    let file = File::create(path).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_sample_csv(BufWriter::new(file), column, sample).map_err(|e| {
        PipelineError::Write {
            path: path.to_path_buf(),
            source: e.into(),
        }
    })?;

    Ok(SaveStatus::Written {
        path: path.to_path_buf(),
        count: sample.len(),
    })
}

/// Write `sample` in the format [`crate::ingestion::load_sample`] will read back from `path`.
///
/// `.csv` paths get a header named `csv_column` (or [`DEFAULT_CSV_COLUMN`]); anything else is
/// newline-delimited text.
pub fn save_sample(
    path: impl AsRef<Path>,
    sample: &Sample,
    csv_column: Option<&str>,
) -> PipelineResult<SaveStatus> {
    let path = path.as_ref();
    match SampleFormat::from_path(path) {
        SampleFormat::Text => write_sample_to_path(path, sample),
        SampleFormat::Csv => {
            write_sample_csv_to_path(path, csv_column.unwrap_or(DEFAULT_CSV_COLUMN), sample)
        }
    }
}

/// Serialize `report` as pretty JSON into `path`.
pub fn write_json_report<T: Serialize>(path: impl AsRef<Path>, report: &T) -> PipelineResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush().map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}
