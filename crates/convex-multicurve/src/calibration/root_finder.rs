//! Newton calibration of one curve unit.
//!
//! The unknowns are the concatenated parameters of the unit's curves. Each
//! evaluation generates trial curves into a private copy of the known data,
//! prices every instrument with the unit's calculator, and maps the curve
//! sensitivities onto the parameters through each curve's node sensitivity:
//!
//! ```text
//! d f_i / d p_j = sum over points (t, s) of s * d y(t) / d p_j
//! ```
//!
//! where `y(t)` is the zero rate of a yield curve or the level of a price
//! index curve.

use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use convex_math::solvers::{NewtonSolverConfig, NewtonVectorSolver, VectorFunction};

use crate::calculators::CalculatorPair;
use crate::calibration::validation::validate_unit;
use crate::calibration::{CurveBuildingBlock, CurveUnit};
use crate::curves::Curve;
use crate::error::{CalibrationError, CalibrationResult};
use crate::provider::MulticurveProvider;
use crate::sensitivity::CurveSensitivity;

/// Maps point sensitivities onto the parameters of the curves in `layout`.
///
/// Curves outside the layout are treated as fixed. Yield curves built on an
/// existing curve pass the sensitivity through to that curve as well.
pub fn sensitivity_to_parameters(
    sensitivity: &CurveSensitivity,
    curves: &MulticurveProvider,
    layout: &CurveBuildingBlock,
) -> CalibrationResult<DVector<f64>> {
    let mut row = DVector::zeros(layout.total());
    for (name, points) in sensitivity.iter() {
        let curve = curves.curve(name)?;
        for &(time, value) in points {
            accumulate(curve, time, value, layout, &mut row)?;
        }
    }
    Ok(row)
}

fn accumulate(
    curve: &Curve,
    time: f64,
    value: f64,
    layout: &CurveBuildingBlock,
    row: &mut DVector<f64>,
) -> CalibrationResult<()> {
    if let Some(start) = layout.start(curve.name()) {
        spread_onto(curve.name(), curve.parameter_sensitivity(time)?, start, layout, value, row)?;
    }
    if let Curve::Yield(yc) = curve {
        let mut added = yc.added_curve();
        while let Some(existing) = added {
            if let Some(start) = layout.start(existing.name()) {
                let d = existing.parameter_sensitivity(time)?;
                spread_onto(existing.name(), d, start, layout, value, row)?;
            }
            added = existing.added_curve();
        }
    }
    Ok(())
}

fn spread_onto(
    name: &str,
    node_sensitivity: Vec<f64>,
    start: usize,
    layout: &CurveBuildingBlock,
    value: f64,
    row: &mut DVector<f64>,
) -> CalibrationResult<()> {
    if layout.count(name) != Some(node_sensitivity.len()) {
        return Err(CalibrationError::invalid_curve(
            name,
            format!(
                "curve exposes {} parameters, layout expects {:?}",
                node_sensitivity.len(),
                layout.count(name)
            ),
        ));
    }
    for (j, d) in node_sensitivity.into_iter().enumerate() {
        row[start + j] += value * d;
    }
    Ok(())
}

/// Generates the unit's curves from `parameters` on top of `known`.
///
/// Curves are generated in declared order; each generator sees the curves
/// generated before it.
pub fn generate_unit_curves(
    unit: &CurveUnit,
    parameters: &[f64],
    known: &MulticurveProvider,
) -> CalibrationResult<MulticurveProvider> {
    let expected = unit.number_of_parameters();
    if parameters.len() != expected {
        return Err(CalibrationError::structural(format!(
            "unit {:?} expects {expected} parameters, got {}",
            unit.curve_names(),
            parameters.len()
        )));
    }
    let mut provider = known.clone();
    let mut offset = 0;
    for curve in unit.curves() {
        let n = curve.generator.number_of_parameters();
        let generated =
            curve
                .generator
                .generate_curve(&curve.name, &parameters[offset..offset + n], &provider)?;
        provider.insert_curve(generated)?;
        offset += n;
    }
    Ok(provider)
}

/// Residuals and Jacobian of one unit as a function of its parameters.
struct UnitObjectiveFunction<'a> {
    unit: &'a CurveUnit,
    known: &'a MulticurveProvider,
    calculators: &'a CalculatorPair,
    layout: CurveBuildingBlock,
}

impl UnitObjectiveFunction<'_> {
    fn curves(&self, x: &DVector<f64>) -> CalibrationResult<MulticurveProvider> {
        generate_unit_curves(self.unit, x.as_slice(), self.known)
    }

    fn residuals(&self, curves: &MulticurveProvider) -> CalibrationResult<DVector<f64>> {
        let values = self
            .unit
            .instruments()
            .map(|instrument| self.calculators.value().evaluate(instrument, curves))
            .collect::<CalibrationResult<Vec<f64>>>()?;
        Ok(DVector::from_vec(values))
    }

    fn jacobian_on(&self, curves: &MulticurveProvider) -> CalibrationResult<DMatrix<f64>> {
        let n = self.layout.total();
        let mut jacobian = DMatrix::zeros(self.unit.number_of_instruments(), n);
        for (i, instrument) in self.unit.instruments().enumerate() {
            let sensitivity = self.calculators.sensitivity().evaluate(instrument, curves)?;
            let row = sensitivity_to_parameters(&sensitivity, curves, &self.layout)?;
            jacobian.set_row(i, &row.transpose());
        }
        Ok(jacobian)
    }
}

impl VectorFunction for UnitObjectiveFunction<'_> {
    type Error = CalibrationError;

    fn evaluate(&self, x: &DVector<f64>) -> CalibrationResult<DVector<f64>> {
        self.residuals(&self.curves(x)?)
    }

    fn jacobian(&self, x: &DVector<f64>) -> CalibrationResult<DMatrix<f64>> {
        self.jacobian_on(&self.curves(x)?)
    }
}

/// A converged unit.
#[derive(Debug, Clone)]
pub struct UnitSolution {
    /// Known data plus the calibrated curves of the unit.
    pub curves: MulticurveProvider,
    /// Calibrated parameters in layout order.
    pub parameters: DVector<f64>,
    /// Residuals at the solution.
    pub residuals: DVector<f64>,
    /// Jacobian `d objective / d parameters` at the solution.
    pub jacobian: DMatrix<f64>,
    /// Newton iterations used.
    pub iterations: u32,
}

impl UnitSolution {
    /// Largest absolute residual.
    #[must_use]
    pub fn residual_norm(&self) -> f64 {
        self.residuals.iter().fold(0.0_f64, |acc, r| acc.max(r.abs()))
    }
}

/// Solves curve units with a Newton iteration.
#[derive(Debug, Clone, Default)]
pub struct MulticurveRootFinder {
    solver: NewtonVectorSolver,
}

impl MulticurveRootFinder {
    /// Creates a root finder with the given solver settings.
    #[must_use]
    pub fn new(config: NewtonSolverConfig) -> Self {
        Self {
            solver: NewtonVectorSolver::new(config),
        }
    }

    /// Solver settings.
    #[must_use]
    pub fn config(&self) -> &NewtonSolverConfig {
        self.solver.config()
    }

    /// Calibrates `unit` on top of `known`.
    ///
    /// `known` is left untouched; the returned solution carries a copy
    /// extended with the unit's curves. Solver failures are reported with
    /// the unit's curve names, calculator failures unchanged.
    pub fn calibrate_unit(
        &self,
        unit: &CurveUnit,
        known: &MulticurveProvider,
        calculators: &CalculatorPair,
    ) -> CalibrationResult<UnitSolution> {
        validate_unit(unit)?;
        let names = unit.curve_names();
        let function = UnitObjectiveFunction {
            unit,
            known,
            calculators,
            layout: unit.parameter_layout(),
        };

        debug!("calibrating unit {:?} ({} parameters)", names, unit.number_of_parameters());
        let result = self
            .solver
            .solve(&function, DVector::from_vec(unit.initial_guess()))
            .map_err(|e| e.in_unit(&names))?;

        let curves = function.curves(&result.root)?;
        let jacobian = function.jacobian_on(&curves)?;
        info!(
            "calibrated unit {:?} in {} iterations (residual {:.3e})",
            names,
            result.iterations,
            result.residual_norm()
        );
        Ok(UnitSolution {
            curves,
            parameters: result.root,
            residuals: result.residual,
            jacobian,
            iterations: result.iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use convex_math::solvers::finite_difference_jacobian;

    use crate::curves::{InterpolatedCurve, InterpolationMethod, YieldCurve};
    use crate::generator::{CurveGenerator, GeneratorYieldInterpolated, MaturityCalculator};
    use crate::index::Currency;
    use crate::instruments::{Cash, InstrumentDerivative};
    use crate::provider::CurveBindings;

    fn usd() -> Currency {
        Currency::new("USD")
    }

    fn deposit(end: f64, rate: f64) -> InstrumentDerivative {
        InstrumentDerivative::Cash(Cash {
            currency: usd(),
            start_time: 0.0,
            end_time: end,
            accrual_factor: end,
            rate,
            notional: 1.0,
        })
    }

    fn known() -> MulticurveProvider {
        MulticurveProvider::new()
            .with_bindings(&CurveBindings::new().with_discounting(usd(), "DSC"))
            .unwrap()
    }

    fn unit() -> CurveUnit {
        let generator: Arc<dyn CurveGenerator> = Arc::new(GeneratorYieldInterpolated::new(
            MaturityCalculator::LastPaymentTime,
            InterpolationMethod::Linear,
        ));
        CurveUnit::new()
            .with_curve(
                "DSC",
                generator,
                vec![deposit(0.5, 0.03), deposit(1.0, 0.035), deposit(2.0, 0.04)],
            )
            .unwrap()
    }

    #[test]
    fn test_deposits_reprice() {
        // Discount factors to 1e-12 need par rates well inside the default
        // function tolerance.
        let config = NewtonSolverConfig::default()
            .with_function_tolerance(1e-14)
            .with_parameter_tolerance(1e-14);
        let solution = MulticurveRootFinder::new(config)
            .calibrate_unit(&unit(), &known(), &CalculatorPair::par_spread())
            .unwrap();
        assert!(solution.residual_norm() < 1e-10);

        let dsc = solution.curves.yield_curve("DSC").unwrap();
        for (end, rate) in [(0.5, 0.03), (1.0, 0.035), (2.0, 0.04)] {
            let df = dsc.discount_factor(end).unwrap();
            assert_relative_eq!(df, 1.0 / (1.0 + rate * end), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_analytic_jacobian_matches_finite_differences() {
        let unit = unit();
        let known = known();
        let calculators = CalculatorPair::par_spread();
        let function = UnitObjectiveFunction {
            unit: &unit,
            known: &known,
            calculators: &calculators,
            layout: unit.parameter_layout(),
        };
        let x = DVector::from_vec(vec![0.031, 0.036, 0.038]);
        let analytic = function.jacobian(&x).unwrap();
        let numeric = finite_difference_jacobian(|p| function.evaluate(p), &x, 1e-7).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(analytic[(i, j)], numeric[(i, j)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_added_curve_sensitivity_reaches_base_parameters() {
        let base = Arc::new(YieldCurve::new(
            "BASE",
            InterpolatedCurve::new(vec![1.0, 2.0], vec![0.02, 0.03], InterpolationMethod::Linear)
                .unwrap(),
        ));
        let spread = YieldCurve::new(
            "SPRD",
            InterpolatedCurve::new(vec![1.0], vec![0.001], InterpolationMethod::Linear).unwrap(),
        )
        .with_added_curve(Arc::clone(&base));
        let curves = MulticurveProvider::new()
            .with_curve(Curve::Yield(base))
            .unwrap()
            .with_curve(Curve::Yield(Arc::new(spread)))
            .unwrap();

        let mut layout = CurveBuildingBlock::new();
        layout.push("BASE", 2);
        let row = sensitivity_to_parameters(&CurveSensitivity::of("SPRD", 1.5, 2.0), &curves, &layout)
            .unwrap();
        assert_relative_eq!(row[0], 1.0);
        assert_relative_eq!(row[1], 1.0);
    }

    #[test]
    fn test_generate_rejects_wrong_length() {
        assert!(matches!(
            generate_unit_curves(&unit(), &[0.01], &known()),
            Err(CalibrationError::StructuralConfiguration { .. })
        ));
    }
}
