//! Descriptive statistics over integer samples.
//!
//! There are two ways to get numbers out of a sample:
//!
//! - The accumulator path ([`Accumulator`], [`mean`], [`min`], [`max`], [`std_dev`]) walks the
//!   values once with running totals. Which values take part is chosen by an [`Inclusion`]
//!   predicate. Its standard deviation uses Bessel's correction and [`newton_sqrt`].
//! - The summary path ([`summarize`]) uses direct formulas over every value and adds median and
//!   amplitude. Its variance convention is explicit ([`VarianceConvention`]).
//!
//! Both paths agree on the mean for the same values. Empty input yields zero sentinels.

use serde::{Deserialize, Serialize};

use crate::types::Statistics;

/// Fixed number of Newton-Raphson steps used by [`newton_sqrt`].
pub const NEWTON_ITERATIONS: usize = 50;

/// Which values of a sample contribute to an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inclusion {
    /// Only valid values (`> 0`).
    Positive,
    /// Every value.
    All,
}

impl Inclusion {
    /// Returns `true` if `value` takes part under this predicate.
    pub fn includes(self, value: i64) -> bool {
        match self {
            Self::Positive => value > 0,
            Self::All => true,
        }
    }
}

/// Divisor used by the summary variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceConvention {
    /// Divide by `n`.
    #[default]
    Population,
    /// Divide by `n - 1` (Bessel's correction).
    Sample,
}

/// Running sum/count/extremes over the values admitted by an [`Inclusion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    inclusion: Inclusion,
    count: usize,
    sum: i128,
    min: Option<i64>,
    max: Option<i64>,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new(inclusion: Inclusion) -> Self {
        Self {
            inclusion,
            count: 0,
            sum: 0,
            min: None,
            max: None,
        }
    }

    /// Accumulate every admitted value of `values`.
    pub fn over(values: &[i64], inclusion: Inclusion) -> Self {
        let mut acc = Self::new(inclusion);
        for &v in values {
            acc.push(v);
        }
        acc
    }

    /// Feed one value. Values rejected by the inclusion predicate are ignored.
    pub fn push(&mut self, value: i64) {
        if !self.inclusion.includes(value) {
            return;
        }
        self.count += 1;
        self.sum += i128::from(value);
        if self.min.is_none_or(|m| value < m) {
            self.min = Some(value);
        }
        if self.max.is_none_or(|m| value > m) {
            self.max = Some(value);
        }
    }

    /// Number of admitted values.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of admitted values, `0.0` if there are none.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / self.count as f64
    }

    /// Smallest admitted value, `0` if there are none.
    pub fn min(&self) -> i64 {
        self.min.unwrap_or(0)
    }

    /// Largest admitted value, `0` if there are none.
    pub fn max(&self) -> i64 {
        self.max.unwrap_or(0)
    }
}

/// Accumulated mean of the values admitted by `inclusion`.
pub fn mean(values: &[i64], inclusion: Inclusion) -> f64 {
    Accumulator::over(values, inclusion).mean()
}

/// Accumulated maximum of the values admitted by `inclusion` (`0` when none are).
pub fn max(values: &[i64], inclusion: Inclusion) -> i64 {
    Accumulator::over(values, inclusion).max()
}

/// Accumulated minimum of the values admitted by `inclusion` (`0` when none are).
pub fn min(values: &[i64], inclusion: Inclusion) -> i64 {
    Accumulator::over(values, inclusion).min()
}

/// Bessel-corrected variance of the admitted values around `mean`.
///
/// Returns `0.0` when fewer than two values are admitted.
pub fn sample_variance(values: &[i64], inclusion: Inclusion, mean: f64) -> f64 {
    let mut n = 0usize;
    let mut sum_sq = 0.0;
    for &v in values {
        if !inclusion.includes(v) {
            continue;
        }
        let diff = v as f64 - mean;
        sum_sq += diff * diff;
        n += 1;
    }
    if n < 2 {
        return 0.0;
    }
    sum_sq / (n - 1) as f64
}

/// Sample standard deviation of the admitted values, with the root taken by [`newton_sqrt`].
pub fn std_dev(values: &[i64], inclusion: Inclusion) -> f64 {
    let m = mean(values, inclusion);
    newton_sqrt(sample_variance(values, inclusion, m))
}

/// Square root by Newton-Raphson, seeded with `value` and run for exactly
/// [`NEWTON_ITERATIONS`] steps.
///
/// There is no convergence check: precision is whatever 50 steps reach from the seed. Inputs
/// `<= 0.0` return `0.0` (variances are never negative, and a zero seed would divide by zero).
pub fn newton_sqrt(value: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    let mut estimate = value;
    for _ in 0..NEWTON_ITERATIONS {
        estimate = (estimate + value / estimate) / 2.0;
    }
    estimate
}

/// Middle value of the sorted input; the mean of the two middle values for even lengths.
///
/// Returns `0.0` for empty input.
pub fn median(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Full summary over every value using direct formulas.
///
/// Variance follows `convention`; the standard deviation is its `f64::sqrt`. With the sample
/// convention and fewer than two values, variance is `0.0`.
pub fn summarize(values: &[i64], convention: VarianceConvention) -> Statistics {
    let n = values.len();
    if n == 0 {
        return Statistics::default();
    }

    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();
    let variance = match convention {
        VarianceConvention::Population => sum_sq / n as f64,
        VarianceConvention::Sample if n < 2 => 0.0,
        VarianceConvention::Sample => sum_sq / (n - 1) as f64,
    };

    Statistics {
        count: n,
        mean,
        median: median(values),
        min: values.iter().copied().min().unwrap_or(0),
        max: values.iter().copied().max().unwrap_or(0),
        variance,
        std_dev: variance.sqrt(),
    }
}
