//! Par spread market quote calculators.

use crate::calculators::discounting;
use crate::calculators::{CurveSensitivityCalculator, PricingCalculator};
use crate::error::CalibrationResult;
use crate::instruments::InstrumentDerivative;
use crate::provider::MulticurveProvider;
use crate::sensitivity::CurveSensitivity;

/// Quote implied by the curves minus the instrument's market quote.
///
/// Rates for deposits, FRAs and fixed-float swaps; the spread for basis
/// swaps; the forward price for bills; the implied zero-coupon rate for
/// inflation swaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParSpreadMarketQuoteCalculator;

impl PricingCalculator for ParSpreadMarketQuoteCalculator {
    fn evaluate(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
    ) -> CalibrationResult<f64> {
        Ok(discounting::par_spread(instrument, curves)?.0)
    }
}

/// Curve sensitivity of [`ParSpreadMarketQuoteCalculator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParSpreadMarketQuoteCurveSensitivityCalculator;

impl CurveSensitivityCalculator for ParSpreadMarketQuoteCurveSensitivityCalculator {
    fn evaluate(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
    ) -> CalibrationResult<CurveSensitivity> {
        Ok(discounting::par_spread(instrument, curves)?.1)
    }
}
