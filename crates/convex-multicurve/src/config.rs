//! Calibration configuration.

use serde::{Deserialize, Serialize};

use convex_math::linear_algebra::DEFAULT_SINGULARITY_THRESHOLD;
use convex_math::solvers::{
    NewtonSolverConfig, DEFAULT_FUNCTION_TOLERANCE, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MAX_STEP_HALVINGS, DEFAULT_PARAMETER_TOLERANCE,
};

use crate::calculators::CalibrationObjective;
use crate::error::{CalibrationError, CalibrationResult};

/// How the blocks of a calibration request are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockExecution {
    /// Blocks run in order; each sees the curves of all earlier blocks.
    #[default]
    Sequential,
    /// Blocks run concurrently against the same known-data snapshot.
    ///
    /// Falls back to sequential iteration when the `parallel` feature is off.
    Parallel,
}

/// Configuration for the curve building repository.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use convex_multicurve::config::CalibrationConfig;
///
/// let config = CalibrationConfig::from_json(r#"{ "max_iterations": 50 }"#).unwrap();
/// assert_eq!(config.max_iterations, 50);
/// assert_eq!(config.function_tolerance, 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Absolute tolerance on the residual infinity norm.
    pub function_tolerance: f64,
    /// Relative tolerance on the Newton step.
    pub parameter_tolerance: f64,
    /// Iteration budget per unit.
    pub max_iterations: u32,
    /// LU pivot-ratio guard.
    pub singularity_threshold: f64,
    /// Line search depth.
    pub max_step_halvings: u32,
    /// Block execution mode.
    pub block_execution: BlockExecution,
    /// Objective used by units without their own calculators.
    pub objective: CalibrationObjective,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            function_tolerance: DEFAULT_FUNCTION_TOLERANCE,
            parameter_tolerance: DEFAULT_PARAMETER_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            singularity_threshold: DEFAULT_SINGULARITY_THRESHOLD,
            max_step_halvings: DEFAULT_MAX_STEP_HALVINGS,
            block_execution: BlockExecution::Sequential,
            objective: CalibrationObjective::ParSpread,
        }
    }
}

impl CalibrationConfig {
    /// Parses a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> CalibrationResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CalibrationError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that tolerances are positive and the iteration budget non-zero.
    pub fn validate(&self) -> CalibrationResult<()> {
        let positive = |x: f64| x > 0.0;
        if !positive(self.function_tolerance) || !positive(self.parameter_tolerance) {
            return Err(CalibrationError::configuration(
                "tolerances must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(CalibrationError::configuration(
                "max_iterations must be at least 1",
            ));
        }
        if self.singularity_threshold.is_nan() || self.singularity_threshold < 0.0 {
            return Err(CalibrationError::configuration(
                "singularity_threshold must be non-negative",
            ));
        }
        Ok(())
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

    /// Sets the iteration budget.
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

    /// Sets the block execution mode.
    #[must_use]
    pub fn with_block_execution(mut self, execution: BlockExecution) -> Self {
        self.block_execution = execution;
        self
    }

    /// Sets the default calibration objective.
    #[must_use]
    pub fn with_objective(mut self, objective: CalibrationObjective) -> Self {
        self.objective = objective;
        self
    }

    /// Solver settings derived from this configuration.
    #[must_use]
    pub fn solver_config(&self) -> NewtonSolverConfig {
        NewtonSolverConfig::new(
            self.function_tolerance,
            self.parameter_tolerance,
            self.max_iterations,
        )
        .with_singularity_threshold(self.singularity_threshold)
        .with_max_step_halvings(self.max_step_halvings)
    }
}
