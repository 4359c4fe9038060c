//! Curve types produced by calibration.
//!
//! - [`YieldCurve`]: continuously compounded zero rates, used for discounting
//!   and forward projection
//! - [`PriceIndexCurve`]: projected price index levels with optional
//!   [`SeasonalCurve`] adjustment
//!
//! Both sit on an [`InterpolatedCurve`] whose node values are the calibrated
//! parameters.

mod interpolated;
mod price_index;
mod seasonal;
mod yield_curve;

pub use interpolated::{InterpolatedCurve, InterpolationMethod};
pub use price_index::PriceIndexCurve;
pub use seasonal::{SeasonalCurve, SEASONAL_FACTORS};
pub use yield_curve::YieldCurve;

use std::sync::Arc;

/// A calibrated curve of either kind.
#[derive(Debug, Clone)]
pub enum Curve {
    /// Interest rate curve.
    Yield(Arc<YieldCurve>),
    /// Price index curve.
    PriceIndex(Arc<PriceIndexCurve>),
}

impl Curve {
    /// Curve name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Curve::Yield(c) => c.name(),
            Curve::PriceIndex(c) => c.name(),
        }
    }

    /// Number of calibrated parameters.
    #[must_use]
    pub fn number_of_parameters(&self) -> usize {
        match self {
            Curve::Yield(c) => c.number_of_parameters(),
            Curve::PriceIndex(c) => c.number_of_parameters(),
        }
    }

    /// Derivative of the curve's native quantity at `t` (zero rate or index
    /// level) with respect to each parameter.
    pub fn parameter_sensitivity(&self, t: f64) -> crate::error::CalibrationResult<Vec<f64>> {
        match self {
            Curve::Yield(c) => c.parameter_sensitivity(t),
            Curve::PriceIndex(c) => c.parameter_sensitivity(t),
        }
    }

    /// Node times.
    #[must_use]
    pub fn x_data(&self) -> &[f64] {
        match self {
            Curve::Yield(c) => c.x_data(),
            Curve::PriceIndex(c) => c.x_data(),
        }
    }

    /// Node values (the calibrated parameters).
    #[must_use]
    pub fn y_data(&self) -> &[f64] {
        match self {
            Curve::Yield(c) => c.y_data(),
            Curve::PriceIndex(c) => c.y_data(),
        }
    }

    /// The yield curve, if this is one.
    #[must_use]
    pub fn as_yield(&self) -> Option<&Arc<YieldCurve>> {
        match self {
            Curve::Yield(c) => Some(c),
            Curve::PriceIndex(_) => None,
        }
    }

    /// The price index curve, if this is one.
    #[must_use]
    pub fn as_price_index(&self) -> Option<&Arc<PriceIndexCurve>> {
        match self {
            Curve::PriceIndex(c) => Some(c),
            Curve::Yield(_) => None,
        }
    }
}
