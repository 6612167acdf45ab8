//! Error types for container construction.

use thiserror::Error;

/// Errors raised when building typed containers from raw arrays.
#[derive(Debug, Error, PartialEq)]
pub enum TypesError {
    /// Two arrays that must be paired index-for-index differ in length.
    #[error("{what}: length mismatch, expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// S-matrix shape does not match the network's port count.
    #[error("S-matrix is {rows}x{cols}, network has {ports} ports")]
    MatrixShape { rows: usize, cols: usize, ports: usize },

    /// Port index outside the network.
    #[error("port index {index} out of range for a {ports}-port network")]
    PortOutOfRange { index: usize, ports: usize },
}
