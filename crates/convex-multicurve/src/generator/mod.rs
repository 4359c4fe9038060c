//! Curve generators.
//!
//! A generator turns a parameter vector into a named curve. Calibration
//! varies the parameters until every instrument's objective is zero.
//!
//! - [`GeneratorYieldInterpolated`]: zero rates at nodes
//! - [`GeneratorPriceIndexInterpolated`]: index levels at nodes
//! - [`GeneratorDecorated`]: an inner generator followed by a fixed
//!   [`CurveTransform`] (seasonality, or adding an existing curve)
//!
//! Generators built with [`NodeSource::Maturities`] learn their nodes from
//! the instruments through [`CurveGenerator::final_generator`].

mod decorated;
mod interpolated;
mod nodes;

pub use decorated::{CurveTransform, GeneratorDecorated};
pub use interpolated::{GeneratorPriceIndexInterpolated, GeneratorYieldInterpolated};
pub use nodes::{MaturityCalculator, NodeSource};

use std::fmt;
use std::sync::Arc;

use crate::curves::Curve;
use crate::error::CalibrationResult;
use crate::instruments::InstrumentDerivative;
use crate::provider::MulticurveProvider;

/// Builds a curve from calibrated parameters.
pub trait CurveGenerator: fmt::Debug + Send + Sync {
    /// Number of parameters the generator consumes.
    fn number_of_parameters(&self) -> usize;

    /// Builds the curve `name` from `parameters`.
    ///
    /// `known` holds the curves available so far; generators that build on
    /// existing curves read them from there.
    fn generate_curve(
        &self,
        name: &str,
        parameters: &[f64],
        known: &MulticurveProvider,
    ) -> CalibrationResult<Curve>;

    /// Generator with any instrument-dependent setup (node placement) done.
    fn final_generator(
        &self,
        instruments: &[InstrumentDerivative],
    ) -> CalibrationResult<Arc<dyn CurveGenerator>>;

    /// Initial parameters from the instruments' initial guess quotes.
    fn initial_guess(&self, quotes: &[f64]) -> Vec<f64>;

    /// Curves read from known data when generating.
    fn required_curves(&self) -> Vec<String> {
        Vec::new()
    }
}
