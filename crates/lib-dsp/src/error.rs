//! Error types for DSP operations.

use lib_types::TypesError;
use thiserror::Error;

/// Errors that can occur during DSP operations.
///
/// All variants are raised by precondition checks before any numerical work
/// starts. NaN or infinite inputs are not errors; they propagate through the
/// arithmetic into the output.
#[derive(Debug, Error, PartialEq)]
pub enum DspError {
    /// Arrays that must be paired index-for-index differ in length.
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Too few samples for the operation.
    #[error("Insufficient samples in {what}: need at least {needed}, got {got}")]
    InsufficientSamples {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    /// An axis cannot be built or used as requested.
    #[error("Invalid axis: {0}")]
    InvalidAxis(String),

    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<TypesError> for DspError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::LengthMismatch {
                what,
                expected,
                actual,
            } => DspError::DimensionMismatch {
                what,
                expected,
                actual,
            },
            other => DspError::InvalidConfig(other.to_string()),
        }
    }
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;
