//! Interpolated yield and price index generators.

use std::sync::Arc;

use crate::curves::{Curve, InterpolatedCurve, InterpolationMethod, PriceIndexCurve, YieldCurve};
use crate::error::{CalibrationError, CalibrationResult};
use crate::generator::{CurveGenerator, MaturityCalculator, NodeSource};
use crate::instruments::{InstrumentDerivative, DEFAULT_INITIAL_GUESS};
use crate::provider::MulticurveProvider;

fn interpolated(
    name: &str,
    nodes: &NodeSource,
    parameters: &[f64],
    method: InterpolationMethod,
) -> CalibrationResult<InterpolatedCurve> {
    let xs = nodes.nodes()?;
    if xs.len() != parameters.len() {
        return Err(CalibrationError::structural(format!(
            "curve {name} has {} nodes but received {} parameters",
            xs.len(),
            parameters.len()
        )));
    }
    InterpolatedCurve::new(xs.to_vec(), parameters.to_vec(), method)
        .map_err(|e| CalibrationError::invalid_curve(name, e.to_string()))
}

/// Yield curve interpolated on zero rates, one node per instrument.
///
/// Parameters are the zero rates at the nodes; the initial guess is the
/// instruments' quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorYieldInterpolated {
    nodes: NodeSource,
    method: InterpolationMethod,
}

impl GeneratorYieldInterpolated {
    /// Generator placing nodes at instrument maturities.
    #[must_use]
    pub fn new(maturity: MaturityCalculator, method: InterpolationMethod) -> Self {
        Self {
            nodes: NodeSource::Maturities(maturity),
            method,
        }
    }

    /// Generator with explicit node times.
    #[must_use]
    pub fn with_nodes(nodes: Vec<f64>, method: InterpolationMethod) -> Self {
        Self {
            nodes: NodeSource::Fixed(nodes),
            method,
        }
    }

    /// Node source.
    #[must_use]
    pub fn node_source(&self) -> &NodeSource {
        &self.nodes
    }
}

impl CurveGenerator for GeneratorYieldInterpolated {
    fn number_of_parameters(&self) -> usize {
        self.nodes.len()
    }

    fn generate_curve(
        &self,
        name: &str,
        parameters: &[f64],
        _known: &MulticurveProvider,
    ) -> CalibrationResult<Curve> {
        let rates = interpolated(name, &self.nodes, parameters, self.method)?;
        Ok(Curve::Yield(Arc::new(YieldCurve::new(name, rates))))
    }

    fn final_generator(
        &self,
        instruments: &[InstrumentDerivative],
    ) -> CalibrationResult<Arc<dyn CurveGenerator>> {
        Ok(Arc::new(Self {
            nodes: self.nodes.finalise(instruments)?,
            method: self.method,
        }))
    }

    fn initial_guess(&self, quotes: &[f64]) -> Vec<f64> {
        quotes.to_vec()
    }
}

/// Price index curve interpolated on index levels.
///
/// Nodes default to the instruments' last index reference. Non-positive
/// quotes in the initial guess are replaced by a neutral level of 100.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorPriceIndexInterpolated {
    nodes: NodeSource,
    method: InterpolationMethod,
}

impl GeneratorPriceIndexInterpolated {
    /// Generator placing nodes at instrument index references.
    #[must_use]
    pub fn new(method: InterpolationMethod) -> Self {
        Self::with_maturity(MaturityCalculator::LastFixingStartTime, method)
    }

    /// Generator placing nodes with a specific maturity calculator.
    #[must_use]
    pub fn with_maturity(maturity: MaturityCalculator, method: InterpolationMethod) -> Self {
        Self {
            nodes: NodeSource::Maturities(maturity),
            method,
        }
    }

    /// Generator with explicit node times.
    #[must_use]
    pub fn with_nodes(nodes: Vec<f64>, method: InterpolationMethod) -> Self {
        Self {
            nodes: NodeSource::Fixed(nodes),
            method,
        }
    }

    /// Node source.
    #[must_use]
    pub fn node_source(&self) -> &NodeSource {
        &self.nodes
    }
}

impl CurveGenerator for GeneratorPriceIndexInterpolated {
    fn number_of_parameters(&self) -> usize {
        self.nodes.len()
    }

    fn generate_curve(
        &self,
        name: &str,
        parameters: &[f64],
        _known: &MulticurveProvider,
    ) -> CalibrationResult<Curve> {
        let levels = interpolated(name, &self.nodes, parameters, self.method)?;
        Ok(Curve::PriceIndex(Arc::new(PriceIndexCurve::new(name, levels))))
    }

    fn final_generator(
        &self,
        instruments: &[InstrumentDerivative],
    ) -> CalibrationResult<Arc<dyn CurveGenerator>> {
        Ok(Arc::new(Self {
            nodes: self.nodes.finalise(instruments)?,
            method: self.method,
        }))
    }

    fn initial_guess(&self, quotes: &[f64]) -> Vec<f64> {
        quotes
            .iter()
            .map(|q| if *q > 0.0 { *q } else { DEFAULT_INITIAL_GUESS })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_yield_generator_builds_curve() {
        let generator =
            GeneratorYieldInterpolated::with_nodes(vec![1.0, 2.0], InterpolationMethod::Linear);
        let curve = generator
            .generate_curve("DSC", &[0.03, 0.04], &MulticurveProvider::new())
            .unwrap();
        let yc = curve.as_yield().unwrap();
        assert_relative_eq!(yc.interest_rate(1.5).unwrap(), 0.035);
        assert_eq!(generator.number_of_parameters(), 2);
    }

    #[test]
    fn test_parameter_count_mismatch() {
        let generator =
            GeneratorYieldInterpolated::with_nodes(vec![1.0, 2.0], InterpolationMethod::Linear);
        assert!(matches!(
            generator.generate_curve("DSC", &[0.03], &MulticurveProvider::new()),
            Err(CalibrationError::StructuralConfiguration { .. })
        ));
    }

    #[test]
    fn test_log_linear_rejects_negative_rates() {
        let generator =
            GeneratorYieldInterpolated::with_nodes(vec![1.0, 2.0], InterpolationMethod::LogLinear);
        assert!(matches!(
            generator.generate_curve("DSC", &[0.03, -0.01], &MulticurveProvider::new()),
            Err(CalibrationError::InvalidCurve { .. })
        ));
    }

    #[test]
    fn test_unfinalised_generator_fails() {
        let generator =
            GeneratorYieldInterpolated::new(MaturityCalculator::LastPaymentTime, InterpolationMethod::Linear);
        assert_eq!(generator.number_of_parameters(), 0);
        assert!(generator
            .generate_curve("DSC", &[], &MulticurveProvider::new())
            .is_err());
    }

    #[test]
    fn test_price_index_guess() {
        let generator = GeneratorPriceIndexInterpolated::new(InterpolationMethod::LogLinear);
        assert_eq!(generator.initial_guess(&[310.0, 0.0, -1.0]), vec![310.0, 100.0, 100.0]);
    }
}
