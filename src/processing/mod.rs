//! In-memory computations over [`crate::types::Sample`].
//!
//! - [`stats`]: accumulator and summary statistics, Newton-Raphson square root
//! - [`sanitize`]: replacement of non-positive values with the truncated valid mean
//! - [`outliers`]: removal of values outside `mean ± k·stddev`
//!
//! None of these mutate their input; each returns a new sample.

pub mod outliers;
pub mod sanitize;
pub mod stats;

pub use outliers::{OutlierFilter, OutlierReport};
pub use sanitize::{sanitize, sanitize_with_valid_mean, Sanitized};
pub use stats::{Accumulator, Inclusion, VarianceConvention};
