//! CSV ingestion: one integer column of a headered CSV becomes a [`crate::types::Sample`].

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

use super::text::{parse_value, ParsedSample};

/// Read one integer column from a CSV file.
///
/// Rules:
///
/// - CSV must have headers.
/// - `column` selects the header by name; `None` selects the first column.
/// - Empty cells are skipped; cells that are not integers are rejected, not fatal.
pub fn read_sample_csv_from_path(
    path: impl AsRef<Path>,
    column: Option<&str>,
) -> PipelineResult<ParsedSample> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    read_sample_csv_from_reader(&mut rdr, column)
}

/// Read one integer column from an existing CSV reader.
pub fn read_sample_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    column: Option<&str>,
) -> PipelineResult<ParsedSample> {
    let headers = rdr.headers()?.clone();

    let col_idx = match column {
        Some(name) => headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
            PipelineError::SchemaMismatch {
                message: format!(
                    "missing required column '{name}'. headers={:?}",
                    headers.iter().collect::<Vec<_>>()
                ),
            }
        })?,
        None if headers.is_empty() => {
            return Err(PipelineError::SchemaMismatch {
                message: "csv has no columns".to_string(),
            });
        }
        None => 0,
    };

    let mut out = ParsedSample::default();
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based for users; +1 again because the header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;
        let raw = record.get(col_idx).unwrap_or("");

        match parse_value(user_row, raw) {
            Ok(Some(v)) => out.sample.values.push(v),
            Ok(None) => {}
            Err(rejected) => out.rejected.push(rejected),
        }
    }

    Ok(out)
}
