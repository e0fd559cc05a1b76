//! Outlier removal using mean ± k·stddev fences.
//!
//! Mean and standard deviation are taken over every value with the accumulator path from
//! [`super::stats`], so the standard deviation is Bessel-corrected and its root comes from
//! [`super::stats::newton_sqrt`].

use serde::Serialize;

use crate::types::Sample;

use super::stats::{self, Inclusion};

/// Default distance from the mean, in standard deviations, past which a value is an outlier.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Outlier filter with a configurable fence multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFilter {
    /// Fences sit at `mean ± multiplier * std_dev`.
    pub multiplier: f64,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

/// Outcome of [`OutlierFilter::apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub mean: f64,
    pub std_dev: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Values within the fences, in original order.
    pub kept: Sample,
    /// Values outside the fences, in original order.
    pub removed: Vec<i64>,
}

impl OutlierReport {
    /// Number of removed values.
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Number of values that survived filtering.
    pub fn kept_count(&self) -> usize {
        self.kept.len()
    }

    /// Returns `true` if at least one value was removed.
    pub fn has_outliers(&self) -> bool {
        !self.removed.is_empty()
    }
}

impl OutlierFilter {
    /// Create a filter with the given multiplier.
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Splits `sample` into values inside `[lower_fence, upper_fence]` and the rest.
    ///
    /// Bounds are inclusive: a value exactly on a fence is kept. An empty sample produces an
    /// empty report with zero statistics.
    pub fn apply(&self, sample: &Sample) -> OutlierReport {
        let values = sample.as_slice();
        let mean = stats::mean(values, Inclusion::All);
        let variance = stats::sample_variance(values, Inclusion::All, mean);
        let std_dev = stats::newton_sqrt(variance);

        let upper_fence = mean + self.multiplier * std_dev;
        let lower_fence = mean - self.multiplier * std_dev;

        let mut kept = Vec::with_capacity(values.len());
        let mut removed = Vec::new();
        for &v in values {
            let x = v as f64;
            if x > upper_fence || x < lower_fence {
                removed.push(v);
            } else {
                kept.push(v);
            }
        }

        OutlierReport {
            mean,
            std_dev,
            lower_fence,
            upper_fence,
            kept: Sample::new(kept),
            removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OutlierFilter, DEFAULT_MULTIPLIER};
    use crate::types::Sample;

    #[test]
    fn removes_single_high_outlier_and_keeps_order() {
        let input = Sample::new(vec![10, 12, 11, 13, 12, 1000]);
        let report = OutlierFilter::default().apply(&input);

        assert!(report.has_outliers());
        assert_eq!(report.removed, vec![1000]);
        assert_eq!(report.kept.values, vec![10, 12, 11, 13, 12]);
        assert_eq!(report.removed_count(), 1);
        assert_eq!(report.kept_count(), 5);
        assert!(report.upper_fence < 1000.0);
        assert!(report.lower_fence < 10.0);
        // Original unchanged
        assert_eq!(input.len(), 6);
    }

    #[test]
    fn fences_use_mean_plus_minus_k_std_dev() {
        let input = Sample::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 100]);
        let report = OutlierFilter::default().apply(&input);

        assert_eq!(report.mean, 14.5);
        let expected_sd = (8182.5f64 / 9.0).sqrt();
        assert!((report.std_dev - expected_sd).abs() < 1e-6);
        assert!((report.upper_fence - (14.5 + DEFAULT_MULTIPLIER * expected_sd)).abs() < 1e-6);
        assert!((report.lower_fence - (14.5 - DEFAULT_MULTIPLIER * expected_sd)).abs() < 1e-6);
        assert_eq!(report.removed, vec![100]);
    }

    #[test]
    fn uniform_sample_sits_on_both_fences_and_is_kept() {
        let input = Sample::new(vec![5, 5, 5, 5]);
        let report = OutlierFilter::default().apply(&input);
        assert_eq!(report.std_dev, 0.0);
        assert_eq!(report.lower_fence, 5.0);
        assert_eq!(report.upper_fence, 5.0);
        assert!(!report.has_outliers());
        assert_eq!(report.kept, input);
    }

    #[test]
    fn symmetric_pair_stays_inside_unit_fences() {
        // mean 0, sample sd sqrt(2)
        let input = Sample::new(vec![-1, 1]);
        let report = OutlierFilter::new(1.0).apply(&input);
        assert!((report.std_dev - 2f64.sqrt()).abs() < 1e-12);
        assert!(!report.has_outliers());
    }

    #[test]
    fn smaller_multiplier_removes_more() {
        let input = Sample::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 100]);
        let strict = OutlierFilter::new(0.2).apply(&input);
        let default = OutlierFilter::default().apply(&input);
        assert_eq!(default.removed, vec![100]);
        assert_eq!(strict.removed, vec![1, 2, 3, 4, 5, 6, 7, 8, 100]);
        assert_eq!(strict.kept.values, vec![9]);
    }

    #[test]
    fn empty_sample_produces_empty_report() {
        let report = OutlierFilter::default().apply(&Sample::default());
        assert!(report.kept.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(report.mean, 0.0);
        assert_eq!(report.std_dev, 0.0);
    }
}
