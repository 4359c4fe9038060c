//! Calibration from dated instrument definitions.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;

use crate::calculators::CalculatorPair;
use crate::calibration::{CalibratedCurves, CalibrationBlock, CurveBuildingRepository, CurveUnit};
use crate::error::CalibrationResult;
use crate::generator::CurveGenerator;
use crate::instruments::{DefinitionConverter, FixingMap, InstrumentConverter, InstrumentDefinition};
use crate::provider::{CurveBindings, MulticurveProvider};

/// A curve to calibrate, with its generator and instrument definitions.
#[derive(Debug, Clone)]
pub struct CurveDefinition {
    /// Curve name.
    pub name: String,
    /// Generator, finalised on the converted instruments.
    pub generator: Arc<dyn CurveGenerator>,
    /// Calibration instruments in node order.
    pub instruments: Vec<InstrumentDefinition>,
}

impl CurveDefinition {
    /// Creates a curve definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        generator: Arc<dyn CurveGenerator>,
        instruments: Vec<InstrumentDefinition>,
    ) -> Self {
        Self {
            name: name.into(),
            generator,
            instruments,
        }
    }
}

/// Curves solved together, optionally with their own calculators.
#[derive(Debug, Clone, Default)]
pub struct UnitDefinition {
    /// Curves in layout order.
    pub curves: Vec<CurveDefinition>,
    /// Calculator override.
    pub calculators: Option<CalculatorPair>,
}

impl UnitDefinition {
    /// Unit of the given curves using the repository calculators.
    #[must_use]
    pub fn new(curves: Vec<CurveDefinition>) -> Self {
        Self {
            curves,
            calculators: None,
        }
    }

    /// Uses `calculators` for this unit.
    #[must_use]
    pub fn with_calculators(mut self, calculators: CalculatorPair) -> Self {
        self.calculators = Some(calculators);
        self
    }
}

/// Units calibrated in order.
#[derive(Debug, Clone, Default)]
pub struct BlockDefinition {
    /// Units in order.
    pub units: Vec<UnitDefinition>,
}

impl BlockDefinition {
    /// Block of the given units.
    #[must_use]
    pub fn new(units: Vec<UnitDefinition>) -> Self {
        Self { units }
    }
}

/// Valuation date, fixings and converter used to turn definitions into
/// instruments.
#[derive(Clone)]
pub struct DefinitionContext {
    /// Valuation date; model time zero.
    pub valuation_date: NaiveDate,
    /// Historical fixings by index name.
    pub fixings: FixingMap,
    /// Definition converter.
    pub converter: Arc<dyn InstrumentConverter>,
}

impl fmt::Debug for DefinitionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionContext")
            .field("valuation_date", &self.valuation_date)
            .field("fixings", &self.fixings.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl DefinitionContext {
    /// Context with no fixings and the default converter.
    #[must_use]
    pub fn new(valuation_date: NaiveDate) -> Self {
        Self {
            valuation_date,
            fixings: FixingMap::new(),
            converter: Arc::new(DefinitionConverter::new()),
        }
    }

    /// Sets the fixings.
    #[must_use]
    pub fn with_fixings(mut self, fixings: FixingMap) -> Self {
        self.fixings = fixings;
        self
    }

    /// Sets the converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn InstrumentConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Converts a definition block into a calibration block.
    pub fn convert_block(&self, block: &BlockDefinition) -> CalibrationResult<CalibrationBlock> {
        let mut converted = CalibrationBlock::new();
        for unit in &block.units {
            converted = converted.with_unit(self.convert_unit(unit)?);
        }
        Ok(converted)
    }

    fn convert_unit(&self, definition: &UnitDefinition) -> CalibrationResult<CurveUnit> {
        let mut unit = CurveUnit::new();
        for curve in &definition.curves {
            let instruments = curve
                .instruments
                .iter()
                .map(|d| {
                    self.converter
                        .to_derivative(d, self.valuation_date, &self.fixings)
                })
                .collect::<CalibrationResult<Vec<_>>>()?;
            debug!("converted {} instruments for curve {}", instruments.len(), curve.name);
            unit = unit.with_curve(curve.name.clone(), Arc::clone(&curve.generator), instruments)?;
        }
        if let Some(calculators) = &definition.calculators {
            unit = unit.with_calculators(calculators.clone());
        }
        Ok(unit)
    }
}

impl CurveBuildingRepository {
    /// Converts definition blocks and calibrates them like
    /// [`make_curves_from_derivatives`](Self::make_curves_from_derivatives).
    pub fn make_curves_from_definitions(
        &self,
        blocks: &[BlockDefinition],
        context: &DefinitionContext,
        known: &MulticurveProvider,
        bindings: &CurveBindings,
        calculators: &CalculatorPair,
    ) -> CalibrationResult<CalibratedCurves> {
        let converted = blocks
            .iter()
            .map(|b| context.convert_block(b))
            .collect::<CalibrationResult<Vec<_>>>()?;
        self.make_curves_from_derivatives(&converted, known, bindings, calculators)
    }
}
