//! Newline-delimited integer ingestion.
//!
//! One integer per line, UTF-8. Blank lines are ignored. Lines that fail to parse are skipped
//! and recorded as [`RejectedLine`]s; they never abort the read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::types::Sample;

/// A line that could not be parsed as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    /// 1-based line (or record) number.
    pub line: usize,
    /// Original text, untrimmed.
    pub raw: String,
    pub message: String,
}

impl From<RejectedLine> for PipelineError {
    fn from(r: RejectedLine) -> Self {
        PipelineError::ParseError {
            line: r.line,
            raw: r.raw,
            message: r.message,
        }
    }
}

/// Parsed values plus everything that was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSample {
    pub sample: Sample,
    pub rejected: Vec<RejectedLine>,
}

/// Parse a single line.
///
/// - `Ok(None)` for blank lines.
/// - `Ok(Some(v))` for a valid integer (surrounding whitespace is trimmed).
/// - `Err(_)` otherwise.
pub fn parse_value(line: usize, raw: &str) -> Result<Option<i64>, RejectedLine> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<i64>().map(Some).map_err(|e| RejectedLine {
        line,
        raw: raw.to_owned(),
        message: e.to_string(),
    })
}

/// Parse a sequence of lines into a [`ParsedSample`], preserving the order of valid values.
pub fn parse_lines<I, S>(lines: I) -> ParsedSample
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = ParsedSample::default();
    for (idx0, raw) in lines.into_iter().enumerate() {
        match parse_value(idx0 + 1, raw.as_ref()) {
            Ok(Some(v)) => out.sample.values.push(v),
            Ok(None) => {}
            Err(rejected) => out.rejected.push(rejected),
        }
    }
    out
}

/// Read newline-delimited integers from a buffered reader.
///
/// Only I/O failures (including invalid UTF-8) are errors; malformed lines are rejected.
pub fn read_sample_from_reader<R: BufRead>(reader: R) -> PipelineResult<ParsedSample> {
    let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
    Ok(parse_lines(lines))
}

/// Read a newline-delimited integer file.
///
/// A missing file surfaces as [`PipelineError::Io`] with `ErrorKind::NotFound`; stages turn
/// that into [`PipelineError::MissingInput`].
pub fn read_sample_file(path: impl AsRef<Path>) -> PipelineResult<ParsedSample> {
    let file = File::open(path.as_ref())?;
    read_sample_from_reader(BufReader::new(file))
}
