//! Construction-time errors for time progress bars.
//!
//! Everything here is a programming or configuration mistake that is
//! caught before a bar is registered. Runtime failures (hooks, terminal
//! I/O) travel as `anyhow::Error` instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    #[error("Duration table must contain at least one unit")]
    EmptyDurationTable,

    #[error("Duration unit length must be strictly positive, got {seconds}")]
    NonPositiveUnit { seconds: u64 },

    #[error("Unknown placeholder '__{name}__' in template \"{template}\"")]
    UnknownPlaceholder { template: String, name: String },

    #[error("Time field '{field}' must be a finite, non-negative number of seconds, got {value}")]
    InvalidTime { field: &'static str, value: f64 },

    #[error("Timescale must be finite and non-negative, got {0}")]
    InvalidTimescale(f64),

    #[error("Segment threshold must be finite and greater than zero, got {0}")]
    InvalidThreshold(f64),
}

/// Result type for bar construction
pub type ProgressResult<T> = Result<T, ProgressError>;
