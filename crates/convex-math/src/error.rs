//! Error types for numerical operations.

use thiserror::Error;

/// A specialized Result type for numerical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during numerical operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Iterative solver exhausted its iteration budget.
    ///
    /// The last iterate is kept so callers can inspect where the solve stalled.
    #[error("Convergence failed after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: u32,
        /// Infinity norm of the residual at the last iterate.
        residual: f64,
        /// Last iterate of the solver.
        last_iterate: Vec<f64>,
    },

    /// Matrix is singular or too ill-conditioned to be inverted.
    #[error("Singular matrix: pivot ratio {pivot_ratio:.2e} below guard")]
    SingularMatrix {
        /// Smallest over largest absolute pivot of the LU factorisation.
        pivot_ratio: f64,
    },

    /// Matrix dimensions are incompatible.
    #[error("Incompatible matrix dimensions: ({rows1}x{cols1}) and ({rows2}x{cols2})")]
    DimensionMismatch {
        /// Rows in first operand.
        rows1: usize,
        /// Columns in first operand.
        cols1: usize,
        /// Rows in second operand.
        rows2: usize,
        /// Columns in second operand.
        cols2: usize,
    },

    /// Interpolation point is outside the valid range.
    #[error("Extrapolation not allowed: {x} is outside [{min}, {max}]")]
    ExtrapolationNotAllowed {
        /// The query point.
        x: f64,
        /// Minimum valid value.
        min: f64,
        /// Maximum valid value.
        max: f64,
    },

    /// Insufficient data points for operation.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates a convergence failed error.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: f64, last_iterate: Vec<f64>) -> Self {
        Self::ConvergenceFailed {
            iterations,
            residual,
            last_iterate,
        }
    }

    /// Creates a singular matrix error.
    #[must_use]
    pub fn singular_matrix(pivot_ratio: f64) -> Self {
        Self::SingularMatrix { pivot_ratio }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates a dimension mismatch error between two shapes.
    #[must_use]
    pub fn dimension_mismatch(lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            rows1: lhs.0,
            cols1: lhs.1,
            rows2: rhs.0,
            cols2: rhs.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::convergence_failed(100, 1e-6, vec![0.01, 0.02]);
        assert!(err.to_string().contains("100 iterations"));
    }

    #[test]
    fn test_singular_display() {
        let err = MathError::singular_matrix(1e-18);
        assert!(err.to_string().contains("Singular"));
    }
}
