//! Error types for DSP operations.

use lib_types::TypeError;
use thiserror::Error;

/// Broad class of a failure, used by callers deciding what to fix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong array rank, mismatched shapes, non-positive rates.
    InvalidInput,
    /// Bad band descriptors, unknown tags, out-of-range indices.
    InvalidConfiguration,
    /// Real data where complex is required, degenerate axes.
    DomainPrecondition,
    /// Transform or factorization failure on otherwise valid input.
    Numerical,
}

/// Errors that can occur during DSP operations.
#[derive(Debug, Error)]
pub enum DspError {
    /// Array rank not supported by the operation.
    #[error("Unsupported axis count: expected {expected}, got {actual}")]
    AxisCount { expected: &'static str, actual: usize },

    /// Input length mismatch.
    #[error("Input length mismatch on {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Insufficient data for operation.
    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Sampling rate not finite and positive.
    #[error("Sampling rate must be positive, got {0}")]
    InvalidSampleRate(f64),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An index was outside its allowed range.
    #[error("{name} {index} outside valid range 1..={max}")]
    IndexOutOfRange {
        name: &'static str,
        index: usize,
        max: usize,
    },

    /// Configuration type rejected at construction.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Operation needs complex-valued (analytic) input.
    #[error("Complex-valued input required: {0}")]
    RequiresComplex(String),

    /// Axis has a single sample.
    #[error("Axis {axis} has a single sample")]
    DegenerateAxis { axis: usize },

    /// Numerical instability detected.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl DspError {
    /// Category of this failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AxisCount { .. }
            | Self::LengthMismatch { .. }
            | Self::InsufficientData { .. }
            | Self::InvalidSampleRate(_) => ErrorCategory::InvalidInput,
            Self::InvalidConfig(_) | Self::IndexOutOfRange { .. } | Self::Type(_) => {
                ErrorCategory::InvalidConfiguration
            }
            Self::RequiresComplex(_) | Self::DegenerateAxis { .. } => {
                ErrorCategory::DomainPrecondition
            }
            Self::NumericalInstability(_) => ErrorCategory::Numerical,
        }
    }
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;

/// Reject rates that are zero, negative or not finite.
pub(crate) fn check_rate(rate: lib_types::Hertz) -> DspResult<()> {
    if rate.is_valid_rate() {
        Ok(())
    } else {
        Err(DspError::InvalidSampleRate(rate.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            DspError::AxisCount {
                expected: "2 or 3",
                actual: 1
            }
            .category(),
            ErrorCategory::InvalidInput
        );
        assert_eq!(
            DspError::from(TypeError::Empty("bands")).category(),
            ErrorCategory::InvalidConfiguration
        );
        assert_eq!(
            DspError::DegenerateAxis { axis: 0 }.category(),
            ErrorCategory::DomainPrecondition
        );
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = DspError::IndexOutOfRange {
            name: "carrier index",
            index: 0,
            max: 64,
        };
        assert_eq!(err.to_string(), "carrier index 0 outside valid range 1..=64");
    }
}
