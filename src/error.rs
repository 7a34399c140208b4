//! Error types for cmatmul operations.
//!
//! The multiplication kernels themselves never fail. Errors only arise where a
//! matrix buffer is acquired or assembled from caller data.

use thiserror::Error;

/// Errors that can occur while building or combining matrices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatmulError {
    /// Memory allocation for a matrix buffer failed.
    #[error("Memory allocation failed: {message} (requested {requested_bytes} bytes)")]
    Allocation {
        /// The number of bytes that was requested.
        requested_bytes: usize,
        /// Human-readable error message.
        message: String,
    },
    /// The buffer size for the requested dimension cannot be represented.
    #[error("Invalid matrix layout: {message} (dimension: {dim})")]
    Layout {
        /// The dimension that caused the error.
        dim: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Two sizes that must agree do not.
    #[error("Dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The size required by the operation.
        expected: usize,
        /// The size that was supplied.
        found: usize,
        /// Which operation detected the mismatch.
        context: &'static str,
    },
}

/// Result type alias for cmatmul operations.
pub type Result<T> = std::result::Result<T, MatmulError>;

/// Creates an allocation error.
pub fn allocation_error(requested_bytes: usize, message: impl Into<String>) -> MatmulError {
    MatmulError::Allocation {
        requested_bytes,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(dim: usize, message: impl Into<String>) -> MatmulError {
    MatmulError::Layout {
        dim,
        message: message.into(),
    }
}

/// Creates a dimension mismatch error.
pub fn dimension_mismatch(expected: usize, found: usize, context: &'static str) -> MatmulError {
    MatmulError::DimensionMismatch {
        expected,
        found,
        context,
    }
}
