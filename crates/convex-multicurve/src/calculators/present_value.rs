//! Present value calculators.

use crate::calculators::discounting;
use crate::calculators::{CurveSensitivityCalculator, PricingCalculator};
use crate::error::CalibrationResult;
use crate::index::Currency;
use crate::instruments::InstrumentDerivative;
use crate::provider::MulticurveProvider;
use crate::sensitivity::CurveSensitivity;

/// FX factor from the instrument currency into the reporting currency.
fn reporting_factor(
    reporting: Option<&Currency>,
    instrument: &InstrumentDerivative,
    curves: &MulticurveProvider,
) -> CalibrationResult<f64> {
    match reporting {
        Some(currency) => curves.fx_matrix().fx_rate(instrument.currency(), currency),
        None => Ok(1.0),
    }
}

/// Present value, optionally converted into a reporting currency.
#[derive(Debug, Clone, Default)]
pub struct PresentValueCalculator {
    reporting_currency: Option<Currency>,
}

impl PresentValueCalculator {
    /// Values in each instrument's own currency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Values converted into `currency` with the provider's FX rates.
    #[must_use]
    pub fn in_currency(currency: Currency) -> Self {
        Self {
            reporting_currency: Some(currency),
        }
    }
}

impl PricingCalculator for PresentValueCalculator {
    fn evaluate(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
    ) -> CalibrationResult<f64> {
        let fx = reporting_factor(self.reporting_currency.as_ref(), instrument, curves)?;
        Ok(discounting::present_value(instrument, curves)?.0 * fx)
    }

    fn quote_sensitivity(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
    ) -> CalibrationResult<f64> {
        let fx = reporting_factor(self.reporting_currency.as_ref(), instrument, curves)?;
        Ok(discounting::present_value_quote_sensitivity(instrument, curves)? * fx)
    }
}

/// Curve sensitivity of [`PresentValueCalculator`].
#[derive(Debug, Clone, Default)]
pub struct PresentValueCurveSensitivityCalculator {
    reporting_currency: Option<Currency>,
}

impl PresentValueCurveSensitivityCalculator {
    /// Sensitivities in each instrument's own currency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sensitivities converted into `currency`.
    #[must_use]
    pub fn in_currency(currency: Currency) -> Self {
        Self {
            reporting_currency: Some(currency),
        }
    }
}

impl CurveSensitivityCalculator for PresentValueCurveSensitivityCalculator {
    fn evaluate(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
    ) -> CalibrationResult<CurveSensitivity> {
        let fx = reporting_factor(self.reporting_currency.as_ref(), instrument, curves)?;
        Ok(discounting::present_value(instrument, curves)?
            .1
            .multiplied_by(fx))
    }
}
