//! Error types for the command-line tools.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Positional arguments are not `<input> <rate>` pairs plus an output
    #[error(
        "expected one or more <input> <rate> pairs followed by <output>, got {count} argument(s)"
    )]
    ArgumentCount {
        /// Number of positional arguments supplied
        count: usize,
    },

    /// Sample rate is not an unsigned 32-bit integer
    #[error("invalid sample rate '{value}' for {input}")]
    InvalidSampleRate {
        /// Input the rate belongs to
        input: String,
        /// Text supplied
        value: String,
    },

    /// More inputs than sample rate mask bits
    #[error("too many inputs: {count} (maximum {max})")]
    TooManyInputs {
        /// Number of input pairs supplied
        count: usize,
        /// Maximum number of inputs
        max: usize,
    },
}
