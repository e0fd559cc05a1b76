use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Stage;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by parsing, persistence and stage functions.
///
/// A single enum is shared across the crate. Stage entrypoints never return it directly: they
/// fold it into a [`crate::pipeline::StageOutcome::Skipped`] so nothing escapes a stage boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error while reading input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration file could not be read or decoded.
    #[error("invalid config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An upstream file expected by a stage does not exist.
    #[error("input file '{}' not found; run the {} stage first", path.display(), producer)]
    MissingInput { path: PathBuf, producer: Stage },

    /// The stage that produces this stage's input did not complete in the same run.
    #[error("skipped because the {producer} stage did not complete: {reason}")]
    UpstreamIncomplete { producer: Stage, reason: String },

    /// A stage needed at least one value and got none.
    #[error("no data available for the {stage} stage")]
    EmptyData { stage: Stage },

    /// A single line could not be converted into an integer.
    #[error("failed to parse line {line}: {message} (raw='{raw}')")]
    ParseError {
        line: usize,
        raw: String,
        message: String,
    },

    /// Persisting a sample failed; in-memory results are unaffected.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input does not have the expected shape (missing CSV column, unknown format, ...).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Serializing a report failed.
    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}
