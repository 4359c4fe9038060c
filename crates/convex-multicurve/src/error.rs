//! Error types for curve calibration.
//!
//! Four failure families are kept distinct so callers can decide what to do
//! next:
//!
//! - [`CalibrationError::StructuralConfiguration`]: the problem is ill-posed
//!   (non-square unit, duplicate or forward-referenced curve). Raised before
//!   any iteration.
//! - [`CalibrationError::ConvergenceFailure`]: the root finder ran out of
//!   iterations; the last iterate is attached.
//! - [`CalibrationError::NumericalSingularity`]: a Jacobian could not be
//!   factorised at some iterate.
//! - [`CalibrationError::InstrumentEvaluation`]: a pricing or sensitivity
//!   calculator failed; passed through unchanged.
//!
//! Nothing is retried internally.

use convex_math::MathError;
use thiserror::Error;

/// A specialized Result type for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Error types for calibration operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Ill-posed calibration input, detected before iterating.
    #[error("Structural configuration error: {reason}")]
    StructuralConfiguration {
        /// Description of the inconsistency.
        reason: String,
    },

    /// Root finder exhausted its iteration budget.
    #[error(
        "Calibration of {curves:?} did not converge after {iterations} iterations (residual: {residual:.2e})"
    )]
    ConvergenceFailure {
        /// Curves of the failing unit.
        curves: Vec<String>,
        /// Number of iterations attempted.
        iterations: u32,
        /// Residual infinity norm at the last iterate.
        residual: f64,
        /// Parameters at the last iterate.
        last_iterate: Vec<f64>,
    },

    /// Jacobian not invertible at some iterate.
    #[error("Singular Jacobian calibrating {curves:?} (pivot ratio {pivot_ratio:.2e})")]
    NumericalSingularity {
        /// Curves of the failing unit.
        curves: Vec<String>,
        /// LU pivot ratio that tripped the guard.
        pivot_ratio: f64,
    },

    /// Pricing or sensitivity calculator failure.
    #[error("Instrument evaluation failed: {reason}")]
    InstrumentEvaluation {
        /// Description of the failure.
        reason: String,
    },

    /// Curve not found in the provider.
    #[error("Curve not found: {name}")]
    CurveNotFound {
        /// Name of the missing curve.
        name: String,
    },

    /// A generator could not build a curve from its parameters.
    #[error("Invalid curve {name}: {reason}")]
    InvalidCurve {
        /// Curve name.
        name: String,
        /// Description of the failure.
        reason: String,
    },

    /// Instrument definition could not be converted.
    #[error("Instrument conversion failed: {reason}")]
    Conversion {
        /// Description of the failure.
        reason: String,
    },

    /// No FX rate for a currency.
    #[error("FX rate not available for {currency}")]
    FxRateNotFound {
        /// ISO code of the currency.
        currency: String,
    },

    /// Invalid calibration configuration.
    #[error("Invalid configuration: {reason}")]
    Configuration {
        /// Description of the problem.
        reason: String,
    },

    /// Other numerical error.
    #[error("Math error: {0}")]
    Math(MathError),
}

impl CalibrationError {
    /// Creates a structural configuration error.
    #[must_use]
    pub fn structural(reason: impl Into<String>) -> Self {
        Self::StructuralConfiguration {
            reason: reason.into(),
        }
    }

    /// Creates an instrument evaluation error.
    #[must_use]
    pub fn instrument_evaluation(reason: impl Into<String>) -> Self {
        Self::InstrumentEvaluation {
            reason: reason.into(),
        }
    }

    /// Creates a curve not found error.
    #[must_use]
    pub fn curve_not_found(name: impl Into<String>) -> Self {
        Self::CurveNotFound { name: name.into() }
    }

    /// Creates an invalid curve error.
    #[must_use]
    pub fn invalid_curve(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCurve {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a conversion error.
    #[must_use]
    pub fn conversion(reason: impl Into<String>) -> Self {
        Self::Conversion {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Attaches the curve names of the unit being solved to solver failures.
    #[must_use]
    pub fn in_unit(self, names: &[String]) -> Self {
        match self {
            Self::ConvergenceFailure {
                curves,
                iterations,
                residual,
                last_iterate,
            } if curves.is_empty() => Self::ConvergenceFailure {
                curves: names.to_vec(),
                iterations,
                residual,
                last_iterate,
            },
            Self::NumericalSingularity {
                curves,
                pivot_ratio,
            } if curves.is_empty() => Self::NumericalSingularity {
                curves: names.to_vec(),
                pivot_ratio,
            },
            other => other,
        }
    }
}

impl From<MathError> for CalibrationError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ConvergenceFailed {
                iterations,
                residual,
                last_iterate,
            } => Self::ConvergenceFailure {
                curves: Vec::new(),
                iterations,
                residual,
                last_iterate,
            },
            MathError::SingularMatrix { pivot_ratio } => Self::NumericalSingularity {
                curves: Vec::new(),
                pivot_ratio,
            },
            other => Self::Math(other),
        }
    }
}
