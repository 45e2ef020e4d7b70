//! Error types of the matrix layer.
//!
//! Scalar arithmetic never fails; it propagates IEEE specials instead.
//! The matrix operations are the only fallible surface.

use thiserror::Error;

/// Failure modes of quad matrix operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// Operand shapes do not fit the operation.
    #[error("matrix dimensions do not match")]
    DimensionMismatch,
    /// A pivot is zero, or below the caller's threshold.
    #[error("matrix is singular to working precision")]
    Singular,
}
