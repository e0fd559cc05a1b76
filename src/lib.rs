//! `sample-pipeline` computes descriptive statistics over integer samples, repairs invalid
//! entries and removes outliers, in three stages that hand off through plain text files.
//!
//! ## Stages
//!
//! 1. **collect**: integers are read (one per line) until a stop word and saved.
//! 2. **process**: valid-only statistics (values `> 0`) are reported, then every value `<= 0` is
//!    replaced with the valid mean truncated toward zero.
//! 3. **analyze**: a full summary (mean, median, min, max, amplitude, variance, std dev) is
//!    reported, then values outside `mean ± 2·stddev` are dropped.
//!
//! See [`pipeline::Pipeline`] for the file-backed stages. The computations are also available
//! directly on in-memory [`types::Sample`]s.
//!
//! ## Quick example: in-memory processing
//!
//! ```rust
//! use sample_pipeline::processing::{sanitize_with_valid_mean, stats, Inclusion, OutlierFilter};
//! use sample_pipeline::types::Sample;
//!
//! let raw = Sample::new(vec![10, 20, 30, -5, 0]);
//! assert_eq!(stats::mean(raw.as_slice(), Inclusion::Positive), 20.0);
//!
//! let sanitized = sanitize_with_valid_mean(&raw);
//! assert_eq!(sanitized.sample.values, vec![10, 20, 30, 20, 20]);
//!
//! let report = OutlierFilter::default().apply(&Sample::new(vec![10, 12, 11, 13, 12, 1000]));
//! assert_eq!(report.removed, vec![1000]);
//! assert_eq!(report.kept.values, vec![10, 12, 11, 13, 12]);
//! ```
//!
//! ## Two statistics paths
//!
//! - The accumulator path ([`processing::stats::Accumulator`]) takes an explicit
//!   [`processing::Inclusion`] (`Positive` or `All`). Its standard deviation is
//!   Bessel-corrected, with the root computed by a fixed 50-step Newton-Raphson
//!   ([`processing::stats::newton_sqrt`]). The outlier filter uses this path.
//! - The summary path ([`processing::stats::summarize`]) uses direct formulas over every value.
//!   Its variance convention is chosen by [`processing::VarianceConvention`] (population by
//!   default).
//!
//! ## Modules
//!
//! - [`ingestion`]: reading samples (newline-delimited text, CSV column)
//! - [`processing`]: statistics, sanitization, outlier filtering
//! - [`export`]: writing samples and JSON reports
//! - [`pipeline`]: file-backed stages, configuration, observers
//! - [`types`]: [`types::Sample`] and [`types::Statistics`]
//! - [`error`]: the shared error type

pub mod error;
pub mod export;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use error::{PipelineError, PipelineResult};
