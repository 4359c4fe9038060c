//! Curve units and calibration blocks.

use std::sync::Arc;

use crate::calculators::CalculatorPair;
use crate::calibration::CurveBuildingBlock;
use crate::error::CalibrationResult;
use crate::generator::CurveGenerator;
use crate::instruments::InstrumentDerivative;

/// One curve of a unit: its finalised generator and calibration instruments.
#[derive(Debug, Clone)]
pub struct UnitCurve {
    /// Curve name.
    pub name: String,
    /// Generator, already finalised on `instruments`.
    pub generator: Arc<dyn CurveGenerator>,
    /// Calibration instruments in declared order.
    pub instruments: Vec<InstrumentDerivative>,
}

impl UnitCurve {
    /// Initial parameters from the instruments' guess quotes.
    #[must_use]
    pub fn initial_guess(&self) -> Vec<f64> {
        let quotes: Vec<f64> = self
            .instruments
            .iter()
            .map(InstrumentDerivative::initial_guess_quote)
            .collect();
        self.generator.initial_guess(&quotes)
    }
}

/// Curves calibrated together as one square system.
///
/// Instruments are laid out curve after curve in declared order, and so are
/// parameters. Units without their own calculators use the repository's.
#[derive(Debug, Clone, Default)]
pub struct CurveUnit {
    curves: Vec<UnitCurve>,
    initial_guess: Option<Vec<f64>>,
    calculators: Option<CalculatorPair>,
}

impl CurveUnit {
    /// Creates an empty unit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a curve, finalising `generator` on `instruments`.
    pub fn with_curve(
        mut self,
        name: impl Into<String>,
        generator: Arc<dyn CurveGenerator>,
        instruments: Vec<InstrumentDerivative>,
    ) -> CalibrationResult<Self> {
        let generator = generator.final_generator(&instruments)?;
        self.curves.push(UnitCurve {
            name: name.into(),
            generator,
            instruments,
        });
        Ok(self)
    }

    /// Overrides the initial guess for the whole unit.
    #[must_use]
    pub fn with_initial_guess(mut self, guess: Vec<f64>) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    /// Uses `calculators` for every instrument of this unit.
    #[must_use]
    pub fn with_calculators(mut self, calculators: CalculatorPair) -> Self {
        self.calculators = Some(calculators);
        self
    }

    /// Curves in declared order.
    #[must_use]
    pub fn curves(&self) -> &[UnitCurve] {
        &self.curves
    }

    /// Curve names in declared order.
    #[must_use]
    pub fn curve_names(&self) -> Vec<String> {
        self.curves.iter().map(|c| c.name.clone()).collect()
    }

    /// Total parameter count.
    #[must_use]
    pub fn number_of_parameters(&self) -> usize {
        self.curves
            .iter()
            .map(|c| c.generator.number_of_parameters())
            .sum()
    }

    /// Total instrument count.
    #[must_use]
    pub fn number_of_instruments(&self) -> usize {
        self.curves.iter().map(|c| c.instruments.len()).sum()
    }

    /// Instruments of every curve, in layout order.
    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentDerivative> {
        self.curves.iter().flat_map(|c| c.instruments.iter())
    }

    /// The starting point of the solve.
    #[must_use]
    pub fn initial_guess(&self) -> Vec<f64> {
        match &self.initial_guess {
            Some(guess) => guess.clone(),
            None => self.curves.iter().flat_map(UnitCurve::initial_guess).collect(),
        }
    }

    /// Calculator override, if any.
    #[must_use]
    pub fn calculators(&self) -> Option<&CalculatorPair> {
        self.calculators.as_ref()
    }

    /// Parameter layout of the unit.
    #[must_use]
    pub fn parameter_layout(&self) -> CurveBuildingBlock {
        let mut layout = CurveBuildingBlock::new();
        for curve in &self.curves {
            layout.push(&curve.name, curve.generator.number_of_parameters());
        }
        layout
    }

    /// Market quote layout of the unit.
    #[must_use]
    pub fn quote_layout(&self) -> CurveBuildingBlock {
        let mut layout = CurveBuildingBlock::new();
        for curve in &self.curves {
            layout.push(&curve.name, curve.instruments.len());
        }
        layout
    }
}

/// Units calibrated in order, each seeing the curves of the ones before.
#[derive(Debug, Clone, Default)]
pub struct CalibrationBlock {
    units: Vec<CurveUnit>,
}

impl CalibrationBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a unit.
    #[must_use]
    pub fn with_unit(mut self, unit: CurveUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Units in order.
    #[must_use]
    pub fn units(&self) -> &[CurveUnit] {
        &self.units
    }

    /// Names of every curve the block calibrates, in calibration order.
    #[must_use]
    pub fn curve_names(&self) -> Vec<String> {
        self.units.iter().flat_map(CurveUnit::curve_names).collect()
    }
}

impl From<Vec<CurveUnit>> for CalibrationBlock {
    fn from(units: Vec<CurveUnit>) -> Self {
        Self { units }
    }
}
