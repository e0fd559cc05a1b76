//! Reading samples.
//!
//! Most callers should use [`load_sample`] (from [`unified`]), which picks a reader by file
//! extension. Format-specific functions live under:
//! - [`text`]: newline-delimited integers, plus the line parser used everywhere
//! - [`csv`]: one integer column of a headered CSV
//!
//! Malformed values never fail a read. They come back as [`RejectedLine`]s next to the sample.

pub mod csv;
pub mod text;
pub mod unified;

pub use text::{
    parse_lines, parse_value, read_sample_file, read_sample_from_reader, ParsedSample, RejectedLine,
};
pub use unified::{load_sample, SampleFormat};
