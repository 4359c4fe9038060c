//! Curve building repository.
//!
//! Runs blocks of units through the [`MulticurveRootFinder`] and records the
//! building block matrices of every calibrated curve.
//!
//! For unit `k` of a block, with `J_k` its Jacobian, `C_k` the derivative of
//! its objectives with respect to the parameters of the block's earlier
//! curves and `D_k` the (diagonal) derivative with respect to its own market
//! quotes, the transition matrix is
//!
//! ```text
//! M_k = J_k^-1 [ -C_k M_(k-1) | -D_k ]
//! ```
//!
//! `M_(k-1)` stacks the transition matrices of the earlier units. Curves
//! known before the block starts are constant.

use log::{info, warn};
use nalgebra::{DMatrix, DVector};

use convex_math::linear_algebra::invert;

use crate::calculators::CalculatorPair;
use crate::calibration::root_finder::{sensitivity_to_parameters, MulticurveRootFinder};
use crate::calibration::validation::validate_block;
use crate::calibration::{
    CalibrationBlock, CurveBuildingBlock, CurveBuildingBlockBundle, CurveBuildingBlockEntry,
    CurveUnit,
};
use crate::config::{BlockExecution, CalibrationConfig};
use crate::error::{CalibrationError, CalibrationResult};
use crate::provider::{CurveBindings, MulticurveProvider};

/// Convergence record of one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDiagnostics {
    /// Curves of the unit.
    pub curves: Vec<String>,
    /// Newton iterations used.
    pub iterations: u32,
    /// Largest absolute residual at the solution.
    pub residual_norm: f64,
}

/// Output of a calibration run.
#[derive(Debug, Clone)]
pub struct CalibratedCurves {
    /// Known data plus every calibrated curve.
    pub provider: MulticurveProvider,
    /// Building block entries of the calibrated curves.
    pub building_blocks: CurveBuildingBlockBundle,
    /// One record per unit, in calibration order.
    pub diagnostics: Vec<UnitDiagnostics>,
}

impl CalibratedCurves {
    fn starting_from(provider: MulticurveProvider) -> Self {
        Self {
            provider,
            building_blocks: CurveBuildingBlockBundle::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Total Newton iterations over every unit.
    #[must_use]
    pub fn total_iterations(&self) -> u32 {
        self.diagnostics.iter().map(|d| d.iterations).sum()
    }
}

/// Calibrates blocks of curve units.
#[derive(Debug, Clone, Default)]
pub struct CurveBuildingRepository {
    config: CalibrationConfig,
    root_finder: MulticurveRootFinder,
}

impl CurveBuildingRepository {
    /// Creates a repository after validating `config`.
    pub fn new(config: CalibrationConfig) -> CalibrationResult<Self> {
        config.validate()?;
        let root_finder = MulticurveRootFinder::new(config.solver_config());
        Ok(Self {
            config,
            root_finder,
        })
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calculators for the configured objective.
    #[must_use]
    pub fn default_calculators(&self) -> CalculatorPair {
        CalculatorPair::for_objective(self.config.objective)
    }

    /// Calibrates the units of one block in order on top of `known`.
    ///
    /// Units use their own calculators when they have them and
    /// `calculators` otherwise.
    pub fn calibrate_block(
        &self,
        block: &CalibrationBlock,
        known: &MulticurveProvider,
        calculators: &CalculatorPair,
    ) -> CalibrationResult<CalibratedCurves> {
        validate_block(block, known)?;

        let mut result = CalibratedCurves::starting_from(known.clone());
        let mut parameters = CurveBuildingBlock::new();
        let mut quotes = CurveBuildingBlock::new();
        let mut transition = DMatrix::<f64>::zeros(0, 0);

        for unit in block.units() {
            let pair = unit.calculators().unwrap_or(calculators);
            let solution = self.root_finder.calibrate_unit(unit, &result.provider, pair)?;
            let names = unit.curve_names();

            let unit_transition = self.unit_transition(
                unit,
                &solution.curves,
                &solution.jacobian,
                pair,
                &parameters,
                &transition,
            )?;

            quotes.extend(&unit.quote_layout());
            transition = stack(&transition, &unit_transition);
            let rows = unit.parameter_layout();
            parameters.extend(&rows);

            let entry = CurveBuildingBlockEntry {
                columns: quotes.clone(),
                rows,
                transition: unit_transition,
                jacobian: solution.jacobian.clone(),
            };
            for name in &names {
                result.building_blocks.add(name.clone(), entry.clone());
            }
            result.diagnostics.push(UnitDiagnostics {
                curves: names,
                iterations: solution.iterations,
                residual_norm: solution.residual_norm(),
            });
            result.provider = solution.curves;
        }

        info!(
            "calibrated block {:?} ({} units, {} iterations)",
            block.curve_names(),
            block.units().len(),
            result.total_iterations()
        );
        Ok(result)
    }

    /// Transition matrix rows of one unit; columns span the quotes of every
    /// unit calibrated so far in the block, this one included.
    fn unit_transition(
        &self,
        unit: &CurveUnit,
        curves: &MulticurveProvider,
        jacobian: &DMatrix<f64>,
        calculators: &CalculatorPair,
        previous: &CurveBuildingBlock,
        previous_transition: &DMatrix<f64>,
    ) -> CalibrationResult<DMatrix<f64>> {
        let n = unit.number_of_instruments();
        let earlier = previous_transition.ncols();
        let mut coupling = DMatrix::<f64>::zeros(n, previous.total());
        let mut quote_derivative = DVector::<f64>::zeros(n);
        for (i, instrument) in unit.instruments().enumerate() {
            if !previous.is_empty() {
                let sensitivity = calculators.sensitivity().evaluate(instrument, curves)?;
                let row = sensitivity_to_parameters(&sensitivity, curves, previous)?;
                coupling.set_row(i, &row.transpose());
            }
            quote_derivative[i] = calculators.value().quote_sensitivity(instrument, curves)?;
        }

        let inverse = invert(jacobian, self.config.singularity_threshold)
            .map_err(|e| CalibrationError::from(e).in_unit(&unit.curve_names()))?;

        let mut rhs = DMatrix::<f64>::zeros(n, earlier + n);
        if earlier > 0 {
            let chained = -(&coupling * previous_transition);
            rhs.view_mut((0, 0), (n, earlier)).copy_from(&chained);
        }
        for i in 0..n {
            rhs[(i, earlier + i)] = -quote_derivative[i];
        }
        Ok(inverse * rhs)
    }

    /// Calibrates blocks in order; each block's curves are known data for
    /// the next.
    ///
    /// With [`BlockExecution::Parallel`] the blocks are instead calibrated
    /// independently on the same known data and their curves merged, so no
    /// block may read another block's curves.
    pub fn make_curves_from_derivatives(
        &self,
        blocks: &[CalibrationBlock],
        known: &MulticurveProvider,
        bindings: &CurveBindings,
        calculators: &CalculatorPair,
    ) -> CalibrationResult<CalibratedCurves> {
        let start = known.clone().with_bindings(bindings)?;
        match self.config.block_execution {
            BlockExecution::Sequential => {
                let mut result = CalibratedCurves::starting_from(start);
                for block in blocks {
                    let calibrated = self
                        .calibrate_block(block, &result.provider, calculators)
                        .map_err(|e| {
                            warn!("block {:?} failed: {e}", block.curve_names());
                            e
                        })?;
                    result.provider = calibrated.provider;
                    result.building_blocks.add_all(&calibrated.building_blocks);
                    result.diagnostics.extend(calibrated.diagnostics);
                }
                Ok(result)
            }
            BlockExecution::Parallel => {
                let independent = self.calibrate_independent(blocks, known, bindings, calculators)?;
                let mut result = CalibratedCurves::starting_from(start);
                for (block, calibrated) in blocks.iter().zip(independent) {
                    for name in block.curve_names() {
                        result
                            .provider
                            .insert_curve(calibrated.provider.curve(&name)?.clone())?;
                    }
                    result.building_blocks.add_all(&calibrated.building_blocks);
                    result.diagnostics.extend(calibrated.diagnostics);
                }
                Ok(result)
            }
        }
    }

    /// Calibrates every block separately on the same known data.
    ///
    /// Blocks may reuse curve names. Runs on the rayon pool when the
    /// execution mode is [`BlockExecution::Parallel`] and the `parallel`
    /// feature is enabled.
    pub fn calibrate_independent(
        &self,
        blocks: &[CalibrationBlock],
        known: &MulticurveProvider,
        bindings: &CurveBindings,
        calculators: &CalculatorPair,
    ) -> CalibrationResult<Vec<CalibratedCurves>> {
        let start = known.clone().with_bindings(bindings)?;
        let run = |block: &CalibrationBlock| self.calibrate_block(block, &start, calculators);
        match self.config.block_execution {
            BlockExecution::Parallel => run_parallel(blocks, run),
            BlockExecution::Sequential => blocks.iter().map(run).collect(),
        }
    }
}

/// Block lower-triangular stacking of transition matrices.
fn stack(previous: &DMatrix<f64>, unit: &DMatrix<f64>) -> DMatrix<f64> {
    let (rows, cols) = previous.shape();
    let mut stacked = DMatrix::zeros(rows + unit.nrows(), unit.ncols());
    stacked.view_mut((0, 0), (rows, cols)).copy_from(previous);
    stacked
        .view_mut((rows, 0), (unit.nrows(), unit.ncols()))
        .copy_from(unit);
    stacked
}

#[cfg(feature = "parallel")]
fn run_parallel<F>(blocks: &[CalibrationBlock], run: F) -> CalibrationResult<Vec<CalibratedCurves>>
where
    F: Fn(&CalibrationBlock) -> CalibrationResult<CalibratedCurves> + Sync + Send,
{
    use rayon::prelude::*;

    blocks.par_iter().map(run).collect()
}

#[cfg(not(feature = "parallel"))]
fn run_parallel<F>(blocks: &[CalibrationBlock], run: F) -> CalibrationResult<Vec<CalibratedCurves>>
where
    F: Fn(&CalibrationBlock) -> CalibrationResult<CalibratedCurves>,
{
    blocks.iter().map(run).collect()
}
