//! FX rates for cross-currency present values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};
use crate::index::Currency;

/// Spot FX rates relative to a base currency.
///
/// Every currency is stored as the value of one unit in the base currency,
/// so any cross rate is a ratio of two entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxMatrix {
    base: Currency,
    value_in_base: HashMap<Currency, f64>,
}

impl FxMatrix {
    /// Creates a matrix containing only `base`.
    #[must_use]
    pub fn new(base: Currency) -> Self {
        let mut value_in_base = HashMap::new();
        value_in_base.insert(base.clone(), 1.0);
        Self {
            base,
            value_in_base,
        }
    }

    /// Base currency.
    #[must_use]
    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// Adds `currency` with one unit worth `rate` units of `reference`.
    pub fn add_currency(
        &mut self,
        currency: Currency,
        reference: &Currency,
        rate: f64,
    ) -> CalibrationResult<()> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(CalibrationError::configuration(format!(
                "FX rate for {currency} must be positive, got {rate}"
            )));
        }
        let reference_value = self.value(reference)?;
        self.value_in_base.insert(currency, rate * reference_value);
        Ok(())
    }

    /// Builder-style [`add_currency`](Self::add_currency).
    pub fn with_currency(
        mut self,
        currency: Currency,
        reference: &Currency,
        rate: f64,
    ) -> CalibrationResult<Self> {
        self.add_currency(currency, reference, rate)?;
        Ok(self)
    }

    fn value(&self, currency: &Currency) -> CalibrationResult<f64> {
        self.value_in_base
            .get(currency)
            .copied()
            .ok_or_else(|| CalibrationError::FxRateNotFound {
                currency: currency.code().to_string(),
            })
    }

    /// Units of `to` per unit of `from`.
    pub fn fx_rate(&self, from: &Currency, to: &Currency) -> CalibrationResult<f64> {
        if from == to {
            return Ok(1.0);
        }
        Ok(self.value(from)? / self.value(to)?)
    }

    /// Converts `amount` from `from` into `to`.
    pub fn convert(&self, amount: f64, from: &Currency, to: &Currency) -> CalibrationResult<f64> {
        Ok(amount * self.fx_rate(from, to)?)
    }

    /// Returns true if the currency is known.
    #[must_use]
    pub fn contains(&self, currency: &Currency) -> bool {
        self.value_in_base.contains_key(currency)
    }
}

impl Default for FxMatrix {
    fn default() -> Self {
        Self::new(Currency::new("USD"))
    }
}
