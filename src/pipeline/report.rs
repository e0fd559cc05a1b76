//! Per-stage reports and the pure computations behind them.

use std::fmt;

use serde::Serialize;

use crate::processing::outliers::{OutlierFilter, OutlierReport};
use crate::processing::sanitize::{sanitize, Sanitized};
use crate::processing::stats::{Accumulator, Inclusion, VarianceConvention, summarize};
use crate::types::{Sample, Statistics};

/// Output of the collect stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    pub sample: Sample,
}

/// Output of the process stage: valid-only statistics, then sanitization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    /// Values read from the raw file.
    pub count: usize,
    /// Mean of values `> 0`.
    pub valid_mean: f64,
    /// Largest value `> 0`, or `0`.
    pub valid_max: i64,
    /// Smallest value `> 0`, or `0`.
    pub valid_min: i64,
    pub head: Vec<i64>,
    pub tail: Vec<i64>,
    pub sanitized: Sanitized,
}

/// Output of the analyze stage: full summary, then outlier removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeReport {
    pub summary: Statistics,
    /// Convention used for `summary.variance` / `summary.std_dev`.
    pub variance_convention: VarianceConvention,
    pub head: Vec<i64>,
    pub tail: Vec<i64>,
    /// Always Bessel-corrected with the Newton square root.
    pub outliers: OutlierReport,
}

/// Valid-only statistics for `sample`, followed by sanitization with the valid mean.
pub fn process_sample(sample: &Sample, preview_len: usize) -> ProcessReport {
    let acc = Accumulator::over(sample.as_slice(), Inclusion::Positive);
    ProcessReport {
        count: sample.len(),
        valid_mean: acc.mean(),
        valid_max: acc.max(),
        valid_min: acc.min(),
        head: sample.head(preview_len).to_vec(),
        tail: sample.tail(preview_len).to_vec(),
        sanitized: sanitize(sample, acc.mean()),
    }
}

/// Full summary of `sample`, followed by outlier filtering.
pub fn analyze_sample(
    sample: &Sample,
    filter: &OutlierFilter,
    convention: VarianceConvention,
    preview_len: usize,
) -> AnalyzeReport {
    AnalyzeReport {
        summary: summarize(sample.as_slice(), convention),
        variance_convention: convention,
        head: sample.head(preview_len).to_vec(),
        tail: sample.tail(preview_len).to_vec(),
        outliers: filter.apply(sample),
    }
}

impl fmt::Display for CollectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sample.is_empty() {
            return write!(f, "no data collected");
        }
        writeln!(f, "collected values : {}", self.sample.len())?;
        write!(f, "values           : {:?}", self.sample.values)
    }
}

impl fmt::Display for ProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "valid-only statistics ({} values read)", self.count)?;
        writeln!(f, "  mean  : {:.2}", self.valid_mean)?;
        writeln!(f, "  max   : {}", self.valid_max)?;
        writeln!(f, "  min   : {}", self.valid_min)?;
        writeln!(f, "  first : {:?}", self.head)?;
        writeln!(f, "  last  : {:?}", self.tail)?;
        if self.sanitized.replacements > 0 {
            write!(
                f,
                "{} invalid value(s) replaced with the mean ({})",
                self.sanitized.replacements, self.sanitized.substitute
            )
        } else {
            write!(f, "no invalid values found")
        }
    }
}

impl fmt::Display for AnalyzeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let convention = match self.variance_convention {
            VarianceConvention::Population => "population",
            VarianceConvention::Sample => "sample",
        };
        writeln!(f, "summary ({convention} variance)")?;
        writeln!(f, "{}", self.summary)?;
        writeln!(f, "  first     : {:?}", self.head)?;
        writeln!(f, "  last      : {:?}", self.tail)?;
        writeln!(f, "outlier removal")?;
        writeln!(f, "  mean        : {:.2}", self.outliers.mean)?;
        writeln!(f, "  std dev     : {:.2}", self.outliers.std_dev)?;
        writeln!(f, "  upper fence : {:.2}", self.outliers.upper_fence)?;
        writeln!(f, "  lower fence : {:.2}", self.outliers.lower_fence)?;
        for v in &self.outliers.removed {
            writeln!(f, "  removed outlier: {v}")?;
        }
        writeln!(f, "  removed     : {}", self.outliers.removed_count())?;
        writeln!(f, "  remaining   : {}", self.outliers.kept_count())?;
        write!(f, "  final values: {:?}", self.outliers.kept.values)
    }
}
