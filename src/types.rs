//! Core data model types.
//!
//! A [`Sample`] is the ordered list of integers flowing between pipeline stages. A
//! [`Statistics`] value is a snapshot computed from one sample and is never updated in place.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered sequence of integers under analysis.
///
/// Order is preserved by every stage. Stages never mutate a sample: sanitization and outlier
/// filtering each build a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample {
    /// Values in insertion order.
    pub values: Vec<i64>,
}

impl Sample {
    /// Create a sample from values.
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the sample holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values as a slice.
    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }

    /// Iterate values in order.
    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.values.iter()
    }

    /// The first `n` values (fewer if the sample is shorter).
    pub fn head(&self, n: usize) -> &[i64] {
        &self.values[..n.min(self.values.len())]
    }

    /// The last `n` values (fewer if the sample is shorter).
    pub fn tail(&self, n: usize) -> &[i64] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }

    /// Count values that are not valid (`<= 0`).
    pub fn invalid_count(&self) -> usize {
        self.values.iter().filter(|v| **v <= 0).count()
    }
}

impl From<Vec<i64>> for Sample {
    fn from(values: Vec<i64>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<i64> for Sample {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Sample {
    type Item = &'a i64;
    type IntoIter = std::slice::Iter<'a, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Snapshot of descriptive statistics for one [`Sample`].
///
/// Empty input produces all-zero fields rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of values that contributed.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: i64,
    pub max: i64,
    pub variance: f64,
    pub std_dev: f64,
}

impl Statistics {
    /// Spread between the largest and smallest value.
    pub fn amplitude(&self) -> i64 {
        self.max - self.min
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  count     : {}", self.count)?;
        writeln!(f, "  mean      : {:.2}", self.mean)?;
        writeln!(f, "  median    : {:.2}", self.median)?;
        writeln!(f, "  max       : {}", self.max)?;
        writeln!(f, "  min       : {}", self.min)?;
        writeln!(f, "  amplitude : {}", self.amplitude())?;
        writeln!(f, "  variance  : {:.2}", self.variance)?;
        write!(f, "  std dev   : {:.2}", self.std_dev)
    }
}
