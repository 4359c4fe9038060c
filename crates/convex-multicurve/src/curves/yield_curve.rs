//! Interest rate curve on continuously compounded zero rates.

use std::sync::Arc;

use crate::curves::InterpolatedCurve;
use crate::error::{CalibrationError, CalibrationResult};

/// A named yield curve.
///
/// The curve interpolates continuously compounded zero rates `r(t)` and
/// discounts with `exp(-r(t) t)`. An optional existing curve is added to the
/// rate; it is fixed data and carries no calibrated parameters.
#[derive(Debug, Clone)]
pub struct YieldCurve {
    name: String,
    rates: InterpolatedCurve,
    added: Option<Arc<YieldCurve>>,
}

impl YieldCurve {
    /// Creates a yield curve from interpolated zero rates.
    #[must_use]
    pub fn new(name: impl Into<String>, rates: InterpolatedCurve) -> Self {
        Self {
            name: name.into(),
            rates,
            added: None,
        }
    }

    /// Adds the rates of an existing curve to this curve's rates.
    #[must_use]
    pub fn with_added_curve(mut self, curve: Arc<YieldCurve>) -> Self {
        self.added = Some(curve);
        self
    }

    /// Curve name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Continuously compounded zero rate at `t`.
    pub fn interest_rate(&self, t: f64) -> CalibrationResult<f64> {
        let base = self
            .rates
            .value(t)
            .map_err(|e| CalibrationError::invalid_curve(&self.name, e.to_string()))?;
        match &self.added {
            Some(added) => Ok(base + added.interest_rate(t)?),
            None => Ok(base),
        }
    }

    /// Discount factor at `t`.
    pub fn discount_factor(&self, t: f64) -> CalibrationResult<f64> {
        Ok((-self.interest_rate(t)? * t).exp())
    }

    /// Simply compounded forward rate over `[start, end]` with accrual `accrual_factor`.
    pub fn simple_forward(
        &self,
        start: f64,
        end: f64,
        accrual_factor: f64,
    ) -> CalibrationResult<f64> {
        Ok((self.discount_factor(start)? / self.discount_factor(end)? - 1.0) / accrual_factor)
    }

    /// Derivative of `r(t)` with respect to each calibrated parameter.
    pub fn parameter_sensitivity(&self, t: f64) -> CalibrationResult<Vec<f64>> {
        self.rates
            .node_sensitivity(t)
            .map_err(|e| CalibrationError::invalid_curve(&self.name, e.to_string()))
    }

    /// Number of calibrated parameters.
    #[must_use]
    pub fn number_of_parameters(&self) -> usize {
        self.rates.len()
    }

    /// Node times.
    #[must_use]
    pub fn x_data(&self) -> &[f64] {
        self.rates.x_data()
    }

    /// Node rates, excluding any added curve.
    #[must_use]
    pub fn y_data(&self) -> &[f64] {
        self.rates.y_data()
    }

    /// The added existing curve, if any.
    #[must_use]
    pub fn added_curve(&self) -> Option<&YieldCurve> {
        self.added.as_deref()
    }
}
