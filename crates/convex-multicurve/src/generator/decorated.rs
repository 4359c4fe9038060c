//! Generators that transform the curve of an inner generator.

use std::sync::Arc;

use crate::curves::{Curve, SeasonalCurve};
use crate::error::{CalibrationError, CalibrationResult};
use crate::generator::CurveGenerator;
use crate::instruments::InstrumentDerivative;
use crate::provider::MulticurveProvider;

/// Fixed transformation applied to a generated curve.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveTransform {
    /// Multiplies a price index curve by a seasonal adjustment.
    Seasonality(SeasonalCurve),
    /// Adds an existing yield curve, read from known data, to the generated
    /// rates.
    AddExistingCurve {
        /// Name of the existing curve.
        curve_name: String,
    },
}

impl CurveTransform {
    /// Applies the transformation.
    pub fn apply(&self, curve: Curve, known: &MulticurveProvider) -> CalibrationResult<Curve> {
        match (self, curve) {
            (CurveTransform::Seasonality(seasonal), Curve::PriceIndex(c)) => Ok(Curve::PriceIndex(
                Arc::new((*c).clone().with_seasonality(seasonal.clone())),
            )),
            (CurveTransform::AddExistingCurve { curve_name }, Curve::Yield(c)) => {
                let existing = Arc::clone(known.yield_curve(curve_name)?);
                Ok(Curve::Yield(Arc::new((*c).clone().with_added_curve(existing))))
            }
            (transform, other) => Err(CalibrationError::invalid_curve(
                other.name(),
                format!("{transform:?} does not apply to this curve type"),
            )),
        }
    }

    /// Curves the transformation reads from known data.
    #[must_use]
    pub fn required_curves(&self) -> Vec<String> {
        match self {
            CurveTransform::Seasonality(_) => Vec::new(),
            CurveTransform::AddExistingCurve { curve_name } => vec![curve_name.clone()],
        }
    }
}

/// An inner generator followed by a [`CurveTransform`].
///
/// Parameters, node placement and initial guess all come from the inner
/// generator.
#[derive(Debug, Clone)]
pub struct GeneratorDecorated {
    inner: Arc<dyn CurveGenerator>,
    transform: CurveTransform,
}

impl GeneratorDecorated {
    /// Wraps `inner` with `transform`.
    #[must_use]
    pub fn new(inner: Arc<dyn CurveGenerator>, transform: CurveTransform) -> Self {
        Self { inner, transform }
    }

    /// Price index generator with seasonality.
    #[must_use]
    pub fn with_seasonality(inner: Arc<dyn CurveGenerator>, seasonal: SeasonalCurve) -> Self {
        Self::new(inner, CurveTransform::Seasonality(seasonal))
    }

    /// Spread generator on top of an existing yield curve.
    #[must_use]
    pub fn with_existing_curve(inner: Arc<dyn CurveGenerator>, curve_name: impl Into<String>) -> Self {
        Self::new(
            inner,
            CurveTransform::AddExistingCurve {
                curve_name: curve_name.into(),
            },
        )
    }

    /// The transformation.
    #[must_use]
    pub fn transform(&self) -> &CurveTransform {
        &self.transform
    }
}

impl CurveGenerator for GeneratorDecorated {
    fn number_of_parameters(&self) -> usize {
        self.inner.number_of_parameters()
    }

    fn generate_curve(
        &self,
        name: &str,
        parameters: &[f64],
        known: &MulticurveProvider,
    ) -> CalibrationResult<Curve> {
        let curve = self.inner.generate_curve(name, parameters, known)?;
        self.transform.apply(curve, known)
    }

    fn final_generator(
        &self,
        instruments: &[InstrumentDerivative],
    ) -> CalibrationResult<Arc<dyn CurveGenerator>> {
        Ok(Arc::new(Self {
            inner: self.inner.final_generator(instruments)?,
            transform: self.transform.clone(),
        }))
    }

    fn initial_guess(&self, quotes: &[f64]) -> Vec<f64> {
        self.inner.initial_guess(quotes)
    }

    fn required_curves(&self) -> Vec<String> {
        let mut names = self.inner.required_curves();
        names.extend(self.transform.required_curves());
        names
    }
}
