//! Pricing and curve sensitivity calculators.
//!
//! Calibration drives each instrument's objective to zero. The objective is
//! supplied by a [`PricingCalculator`]; its [`CurveSensitivityCalculator`]
//! companion provides the analytic curve sensitivities the Jacobian is built
//! from. A [`CalculatorPair`] keeps the two together.
//!
//! Two objectives are built in:
//!
//! - **Par spread** ([`CalibrationObjective::ParSpread`]): implied quote minus
//!   market quote. Its derivative with respect to the market quote is `-1`
//!   by construction.
//! - **Present value** ([`CalibrationObjective::PresentValue`]): the
//!   instrument PV at its market quote.

mod discounting;
mod par_spread;
mod present_value;

pub use par_spread::{
    ParSpreadMarketQuoteCalculator, ParSpreadMarketQuoteCurveSensitivityCalculator,
};
pub use present_value::{PresentValueCalculator, PresentValueCurveSensitivityCalculator};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CalibrationResult;
use crate::instruments::InstrumentDerivative;
use crate::provider::MulticurveProvider;
use crate::sensitivity::CurveSensitivity;

/// Computes the calibration objective of an instrument.
pub trait PricingCalculator: fmt::Debug + Send + Sync {
    /// Objective value on the given curves.
    fn evaluate(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
    ) -> CalibrationResult<f64>;

    /// Derivative of the objective with respect to the instrument's market
    /// quote, curves held fixed.
    ///
    /// Defaults to `-1`, the par spread convention.
    fn quote_sensitivity(
        &self,
        _instrument: &InstrumentDerivative,
        _curves: &MulticurveProvider,
    ) -> CalibrationResult<f64> {
        Ok(-1.0)
    }
}

/// Computes the curve sensitivity of the calibration objective.
pub trait CurveSensitivityCalculator: fmt::Debug + Send + Sync {
    /// Point sensitivities of the objective on the given curves.
    fn evaluate(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
    ) -> CalibrationResult<CurveSensitivity>;
}

/// Built-in calibration objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationObjective {
    /// Implied quote minus market quote.
    #[default]
    ParSpread,
    /// Present value.
    PresentValue,
}

/// A pricing calculator and its matching sensitivity calculator.
#[derive(Debug, Clone)]
pub struct CalculatorPair {
    value: Arc<dyn PricingCalculator>,
    sensitivity: Arc<dyn CurveSensitivityCalculator>,
}

impl CalculatorPair {
    /// Pairs two calculators. They must compute the same objective.
    #[must_use]
    pub fn new(
        value: Arc<dyn PricingCalculator>,
        sensitivity: Arc<dyn CurveSensitivityCalculator>,
    ) -> Self {
        Self { value, sensitivity }
    }

    /// Par spread market quote objective.
    #[must_use]
    pub fn par_spread() -> Self {
        Self::new(
            Arc::new(ParSpreadMarketQuoteCalculator),
            Arc::new(ParSpreadMarketQuoteCurveSensitivityCalculator),
        )
    }

    /// Present value objective in each instrument's own currency.
    #[must_use]
    pub fn present_value() -> Self {
        Self::new(
            Arc::new(PresentValueCalculator::new()),
            Arc::new(PresentValueCurveSensitivityCalculator::new()),
        )
    }

    /// Pair for a built-in objective.
    #[must_use]
    pub fn for_objective(objective: CalibrationObjective) -> Self {
        match objective {
            CalibrationObjective::ParSpread => Self::par_spread(),
            CalibrationObjective::PresentValue => Self::present_value(),
        }
    }

    /// The pricing calculator.
    #[must_use]
    pub fn value(&self) -> &dyn PricingCalculator {
        self.value.as_ref()
    }

    /// The sensitivity calculator.
    #[must_use]
    pub fn sensitivity(&self) -> &dyn CurveSensitivityCalculator {
        self.sensitivity.as_ref()
    }
}

impl Default for CalculatorPair {
    fn default() -> Self {
        Self::par_spread()
    }
}

#[cfg(test)]
mod tests;
