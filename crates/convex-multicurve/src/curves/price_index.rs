//! Price index curve.

use crate::curves::{InterpolatedCurve, SeasonalCurve};
use crate::error::{CalibrationError, CalibrationResult};

/// Projected values of a price index by model time.
///
/// Node values are index levels; an optional [`SeasonalCurve`] multiplies
/// the interpolated level.
#[derive(Debug, Clone)]
pub struct PriceIndexCurve {
    name: String,
    values: InterpolatedCurve,
    seasonality: Option<SeasonalCurve>,
}

impl PriceIndexCurve {
    /// Creates a price index curve.
    #[must_use]
    pub fn new(name: impl Into<String>, values: InterpolatedCurve) -> Self {
        Self {
            name: name.into(),
            values,
            seasonality: None,
        }
    }

    /// Applies a seasonal adjustment.
    #[must_use]
    pub fn with_seasonality(mut self, seasonality: SeasonalCurve) -> Self {
        self.seasonality = Some(seasonality);
        self
    }

    /// Curve name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn season(&self, t: f64) -> f64 {
        self.seasonality.as_ref().map_or(1.0, |s| s.factor(t))
    }

    /// Index level at `t`.
    pub fn price_index(&self, t: f64) -> CalibrationResult<f64> {
        let level = self
            .values
            .value(t)
            .map_err(|e| CalibrationError::invalid_curve(&self.name, e.to_string()))?;
        Ok(level * self.season(t))
    }

    /// Derivative of the index level at `t` with respect to each parameter.
    pub fn parameter_sensitivity(&self, t: f64) -> CalibrationResult<Vec<f64>> {
        let season = self.season(t);
        let mut sensitivity = self
            .values
            .node_sensitivity(t)
            .map_err(|e| CalibrationError::invalid_curve(&self.name, e.to_string()))?;
        sensitivity.iter_mut().for_each(|s| *s *= season);
        Ok(sensitivity)
    }

    /// Number of calibrated parameters.
    #[must_use]
    pub fn number_of_parameters(&self) -> usize {
        self.values.len()
    }

    /// Node times.
    #[must_use]
    pub fn x_data(&self) -> &[f64] {
        self.values.x_data()
    }

    /// Node levels, before seasonality.
    #[must_use]
    pub fn y_data(&self) -> &[f64] {
        self.values.y_data()
    }

    /// Seasonal adjustment, if any.
    #[must_use]
    pub fn seasonality(&self) -> Option<&SeasonalCurve> {
        self.seasonality.as_ref()
    }
}
