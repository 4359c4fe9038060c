//! Multi-dimensional root finding.
//!
//! Curve calibration is a square nonlinear system: `n` instrument objectives
//! in `n` curve parameters. [`NewtonVectorSolver`] solves such systems with a
//! Newton iteration on an analytic Jacobian, using a dense LU solve for each
//! step and a backtracking line search on the residual norm.
//!
//! # Example
//!
//! ```rust
//! use convex_math::error::MathError;
//! use convex_math::solvers::{NewtonSolverConfig, NewtonVectorSolver, VectorFunction};
//! use nalgebra::{DMatrix, DVector};
//!
//! // x^2 + y^2 = 4, x = y
//! struct Circle;
//!
//! impl VectorFunction for Circle {
//!     type Error = MathError;
//!
//!     fn evaluate(&self, x: &DVector<f64>) -> Result<DVector<f64>, MathError> {
//!         Ok(DVector::from_vec(vec![x[0] * x[0] + x[1] * x[1] - 4.0, x[0] - x[1]]))
//!     }
//!
//!     fn jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>, MathError> {
//!         Ok(DMatrix::from_row_slice(2, 2, &[2.0 * x[0], 2.0 * x[1], 1.0, -1.0]))
//!     }
//! }
//!
//! let solver = NewtonVectorSolver::new(NewtonSolverConfig::default());
//! let result = solver.solve(&Circle, DVector::from_vec(vec![1.0, 0.5])).unwrap();
//! assert!((result.root[0] - 2.0_f64.sqrt()).abs() < 1e-10);
//! ```

mod finite_difference;
mod newton;

pub use finite_difference::finite_difference_jacobian;
pub use newton::{NewtonVectorSolver, VectorFunction, VectorSolverResult};

use crate::linear_algebra::DEFAULT_SINGULARITY_THRESHOLD;

/// Default absolute tolerance on the residual infinity norm.
pub const DEFAULT_FUNCTION_TOLERANCE: f64 = 1e-10;

/// Default tolerance on the Newton step infinity norm.
pub const DEFAULT_PARAMETER_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default number of step halvings in the line search.
pub const DEFAULT_MAX_STEP_HALVINGS: u32 = 10;

/// Configuration for [`NewtonVectorSolver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonSolverConfig {
    /// Convergence when the residual infinity norm is at or below this value.
    pub function_tolerance: f64,
    /// Convergence when the step infinity norm is at or below
    /// `parameter_tolerance * (1 + |x|_inf)`.
    pub parameter_tolerance: f64,
    /// Maximum number of Newton iterations.
    pub max_iterations: u32,
    /// LU pivot-ratio guard below which the Jacobian counts as singular.
    pub singularity_threshold: f64,
    /// Maximum number of step halvings while the residual norm does not decrease.
    pub max_step_halvings: u32,
}

impl Default for NewtonSolverConfig {
    fn default() -> Self {
        Self {
            function_tolerance: DEFAULT_FUNCTION_TOLERANCE,
            parameter_tolerance: DEFAULT_PARAMETER_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            singularity_threshold: DEFAULT_SINGULARITY_THRESHOLD,
            max_step_halvings: DEFAULT_MAX_STEP_HALVINGS,
        }
    }
}

impl NewtonSolverConfig {
    /// Creates a configuration with both tolerances set and defaults elsewhere.
    #[must_use]
    pub fn new(function_tolerance: f64, parameter_tolerance: f64, max_iterations: u32) -> Self {
        Self {
            function_tolerance,
            parameter_tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    /// Sets the residual tolerance.
    #[must_use]
    pub fn with_function_tolerance(mut self, tolerance: f64) -> Self {
        self.function_tolerance = tolerance;
        self
    }

    /// Sets the step tolerance.
    #[must_use]
    pub fn with_parameter_tolerance(mut self, tolerance: f64) -> Self {
        self.parameter_tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the singularity guard.
    #[must_use]
    pub fn with_singularity_threshold(mut self, threshold: f64) -> Self {
        self.singularity_threshold = threshold;
        self
    }

    /// Sets the line search depth. Zero disables backtracking.
    #[must_use]
    pub fn with_max_step_halvings(mut self, halvings: u32) -> Self {
        self.max_step_halvings = halvings;
        self
    }
}
