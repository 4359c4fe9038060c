//! Newton iteration for square nonlinear systems.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::MathError;
use crate::linear_algebra::{inf_norm, solve_linear_system};
use crate::solvers::NewtonSolverConfig;

/// A vector-valued function with an analytic Jacobian.
///
/// The error type lets callers surface their own evaluation failures
/// unchanged; solver failures are converted through `From<MathError>`.
pub trait VectorFunction {
    /// Error raised by evaluation and by the solver.
    type Error: From<MathError>;

    /// Evaluates the residual vector at `x`.
    fn evaluate(&self, x: &DVector<f64>) -> Result<DVector<f64>, Self::Error>;

    /// Evaluates the Jacobian `d residual_i / d x_j` at `x`.
    fn jacobian(&self, x: &DVector<f64>) -> Result<DMatrix<f64>, Self::Error>;
}

/// Result of a converged vector solve.
#[derive(Debug, Clone)]
pub struct VectorSolverResult {
    /// The root.
    pub root: DVector<f64>,
    /// Residual vector at the root.
    pub residual: DVector<f64>,
    /// Number of Newton steps taken.
    pub iterations: u32,
}

impl VectorSolverResult {
    /// Infinity norm of the residual at the root.
    #[must_use]
    pub fn residual_norm(&self) -> f64 {
        inf_norm(&self.residual)
    }
}

/// Newton root finder with backtracking on the residual infinity norm.
///
/// Converges when either the residual norm is at or below the function
/// tolerance, or the full Newton step is at or below the parameter tolerance.
/// Fails with [`MathError::ConvergenceFailed`] (carrying the last iterate)
/// when the iteration budget is exhausted or no halving of the step lowers
/// the residual, and with
/// [`MathError::SingularMatrix`] when a Jacobian cannot be factorised.
#[derive(Debug, Clone, Default)]
pub struct NewtonVectorSolver {
    config: NewtonSolverConfig,
}

impl NewtonVectorSolver {
    /// Creates a solver with the given configuration.
    #[must_use]
    pub fn new(config: NewtonSolverConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NewtonSolverConfig {
        &self.config
    }

    /// Solves `f(x) = 0` starting from `initial_guess`.
    pub fn solve<F: VectorFunction>(
        &self,
        f: &F,
        initial_guess: DVector<f64>,
    ) -> Result<VectorSolverResult, F::Error> {
        let config = &self.config;
        let mut x = initial_guess;
        let mut fx = f.evaluate(&x)?;
        if fx.len() != x.len() {
            return Err(MathError::dimension_mismatch((fx.len(), 1), (x.len(), 1)).into());
        }
        let mut norm = inf_norm(&fx);

        for iteration in 0..config.max_iterations {
            if norm <= config.function_tolerance {
                return Ok(VectorSolverResult {
                    root: x,
                    residual: fx,
                    iterations: iteration,
                });
            }

            let jacobian = f.jacobian(&x)?;
            if jacobian.shape() != (x.len(), x.len()) {
                return Err(MathError::dimension_mismatch(jacobian.shape(), (x.len(), x.len())).into());
            }
            let step = solve_linear_system(&jacobian, &(-&fx), config.singularity_threshold)?;

            let mut scale = 1.0;
            let mut trial = &x + &step;
            let mut f_trial = f.evaluate(&trial)?;
            let mut trial_norm = inf_norm(&f_trial);
            let mut halvings = 0;
            while (trial_norm.is_nan() || trial_norm >= norm) && halvings < config.max_step_halvings {
                scale *= 0.5;
                halvings += 1;
                trial = &x + &step * scale;
                f_trial = f.evaluate(&trial)?;
                trial_norm = inf_norm(&f_trial);
            }

            let step_norm = inf_norm(&step);
            let small_step = step_norm <= config.parameter_tolerance * (1.0 + inf_norm(&x));
            debug!(
                "newton iteration {}: residual {:.3e} -> {:.3e}, step {:.3e} (scale {})",
                iteration + 1,
                norm,
                trial_norm,
                step_norm,
                scale
            );

            if trial_norm.is_nan() || trial_norm >= norm {
                // Every halving failed: the residual is not shrinking.
                if small_step {
                    return Ok(VectorSolverResult {
                        root: x,
                        residual: fx,
                        iterations: iteration + 1,
                    });
                }
                warn!(
                    "newton line search failed at iteration {} (residual {:.3e})",
                    iteration + 1,
                    norm
                );
                return Err(
                    MathError::convergence_failed(iteration + 1, norm, x.as_slice().to_vec()).into(),
                );
            }

            x = trial;
            fx = f_trial;
            norm = trial_norm;

            if norm <= config.function_tolerance || small_step {
                return Ok(VectorSolverResult {
                    root: x,
                    residual: fx,
                    iterations: iteration + 1,
                });
            }
        }

        warn!(
            "newton solver did not converge in {} iterations (residual {:.3e})",
            config.max_iterations, norm
        );
        Err(MathError::convergence_failed(config.max_iterations, norm, x.as_slice().to_vec()).into())
    }
}
