//! Monthly seasonality for price index curves.

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};

/// Number of explicit monthly factors; the twelfth is implied.
pub const SEASONAL_FACTORS: usize = 11;

/// Cumulative monthly seasonal adjustment.
///
/// Eleven factors are given; the twelfth is set so that the product over a
/// full year is one. The curve is a step function of time: before the first
/// step it is one, and at each subsequent step it is multiplied by the next
/// monthly factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalCurve {
    steps: Vec<f64>,
    cumulative: Vec<f64>,
}

impl SeasonalCurve {
    /// Builds the curve from increasing step times and eleven monthly factors.
    pub fn new(steps: Vec<f64>, factors: &[f64]) -> CalibrationResult<Self> {
        if factors.len() != SEASONAL_FACTORS {
            return Err(CalibrationError::configuration(format!(
                "seasonality needs {SEASONAL_FACTORS} monthly factors, got {}",
                factors.len()
            )));
        }
        if factors.iter().any(|f| !(f.is_finite() && *f > 0.0)) {
            return Err(CalibrationError::configuration(
                "seasonal factors must be positive",
            ));
        }
        if steps.is_empty() || steps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CalibrationError::configuration(
                "seasonal steps must be non-empty and strictly increasing",
            ));
        }

        let mut monthly = factors.to_vec();
        monthly.push(1.0 / factors.iter().product::<f64>());

        let mut cumulative = Vec::with_capacity(steps.len());
        let mut level = 1.0;
        for k in 0..steps.len() {
            if k > 0 {
                level *= monthly[(k - 1) % monthly.len()];
            }
            cumulative.push(level);
        }
        Ok(Self { steps, cumulative })
    }

    /// Seasonal multiplier at `t`.
    #[must_use]
    pub fn factor(&self, t: f64) -> f64 {
        let idx = self.steps.partition_point(|s| *s <= t);
        if idx == 0 {
            1.0
        } else {
            self.cumulative[idx - 1]
        }
    }

    /// Step times.
    #[must_use]
    pub fn steps(&self) -> &[f64] {
        &self.steps
    }
}
