//! Replacement of invalid (non-positive) values.

use serde::Serialize;

use crate::types::Sample;

use super::stats::{self, Inclusion};

/// Result of [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sanitized {
    /// New sample with every invalid value replaced.
    pub sample: Sample,
    /// How many values were replaced.
    pub replacements: usize,
    /// The value written in place of each invalid entry.
    pub substitute: i64,
}

/// Returns a copy of `sample` where every value `<= 0` becomes `valid_mean` truncated toward
/// zero. Valid values are copied unchanged and order is preserved.
///
/// `valid_mean` is expected to be the valid-only mean of the same sample (see
/// [`sanitize_with_valid_mean`]). The truncation is an `as` cast, not rounding.
pub fn sanitize(sample: &Sample, valid_mean: f64) -> Sanitized {
    let substitute = valid_mean as i64;
    let mut replacements = 0usize;
    let values = sample
        .iter()
        .map(|&v| {
            if v <= 0 {
                replacements += 1;
                substitute
            } else {
                v
            }
        })
        .collect();

    Sanitized {
        sample: Sample::new(values),
        replacements,
        substitute,
    }
}

/// Computes the valid-only mean of `sample` and sanitizes with it.
pub fn sanitize_with_valid_mean(sample: &Sample) -> Sanitized {
    let valid_mean = stats::mean(sample.as_slice(), Inclusion::Positive);
    sanitize(sample, valid_mean)
}

#[cfg(test)]
mod tests {
    use super::{sanitize, sanitize_with_valid_mean};
    use crate::types::Sample;

    #[test]
    fn replaces_non_positive_values_with_valid_mean() {
        let input = Sample::new(vec![10, 20, 30, -5, 0]);
        let out = sanitize_with_valid_mean(&input);

        assert_eq!(out.sample.values, vec![10, 20, 30, 20, 20]);
        assert_eq!(out.replacements, 2);
        assert_eq!(out.substitute, 20);
        // Original unchanged
        assert_eq!(input.values, vec![10, 20, 30, -5, 0]);
    }

    #[test]
    fn substitute_is_truncated_not_rounded() {
        let input = Sample::new(vec![1, 2, 0]);
        let out = sanitize(&input, 1.99);
        assert_eq!(out.sample.values, vec![1, 2, 1]);
        assert_eq!(out.substitute, 1);
    }

    #[test]
    fn no_valid_values_substitutes_zero() {
        let input = Sample::new(vec![-1, -2, 0]);
        let out = sanitize_with_valid_mean(&input);
        assert_eq!(out.sample.values, vec![0, 0, 0]);
        assert_eq!(out.replacements, 3);
    }

    #[test]
    fn all_valid_sample_is_returned_unchanged() {
        let input = Sample::new(vec![4, 8, 15, 16, 23, 42]);
        let out = sanitize_with_valid_mean(&input);
        assert_eq!(out.sample, input);
        assert_eq!(out.replacements, 0);
    }

    #[test]
    fn empty_sample_stays_empty() {
        let out = sanitize_with_valid_mean(&Sample::default());
        assert!(out.sample.is_empty());
        assert_eq!(out.replacements, 0);
    }
}
