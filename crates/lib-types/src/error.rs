//! Construction-time validation errors for the configuration types.

use thiserror::Error;

/// Errors raised while building or parsing closed configuration types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// A tag string did not name any known variant.
    #[error("Unknown {kind} '{value}'")]
    UnknownTag { kind: &'static str, value: String },

    /// Parallel sub-band sequences had different lengths.
    #[error("Sub-band field lengths differ: shapes={shapes}, frequencies={freqs}, widths={widths}")]
    SubBandLengthMismatch {
        shapes: usize,
        freqs: usize,
        widths: usize,
    },

    /// A required list was empty.
    #[error("Field '{0}' must not be empty")]
    Empty(&'static str),

    /// A numeric field was outside its valid domain.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// A matrix did not have the expected shape.
    #[error("Matrix '{name}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A channel index was outside the recording.
    #[error("Channel index {index} out of range for {available} channels")]
    ChannelOutOfRange { index: usize, available: usize },
}

/// Result type for type construction.
pub type TypeResult<T> = Result<T, TypeError>;
