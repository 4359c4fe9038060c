//! Parameter and market quote sensitivities.
//!
//! A value's sensitivity to the calibrated curve parameters is carried to
//! the calibration market quotes through the transition matrices recorded
//! in a [`CurveBuildingBlockBundle`]:
//!
//! ```text
//! d V / d q = sum over curves c of (d V / d p_c) * (d p_c / d q)
//! ```

use std::collections::BTreeMap;

use nalgebra::DVector;

use crate::calculators::CurveSensitivityCalculator;
use crate::calibration::root_finder::sensitivity_to_parameters;
use crate::calibration::CurveBuildingBlockBundle;
use crate::error::{CalibrationError, CalibrationResult};
use crate::instruments::InstrumentDerivative;
use crate::provider::MulticurveProvider;

/// Sensitivities keyed by curve name.
///
/// Used for both parameter sensitivities (one entry per curve parameter) and
/// market quote sensitivities (one entry per calibration instrument).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSensitivity {
    sensitivities: BTreeMap<String, DVector<f64>>,
}

impl ParameterSensitivity {
    /// Creates an empty sensitivity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `values` to the entry of `curve`.
    pub fn add(&mut self, curve: impl Into<String>, values: DVector<f64>) -> CalibrationResult<()> {
        let curve = curve.into();
        match self.sensitivities.get_mut(&curve) {
            Some(existing) if existing.len() != values.len() => {
                Err(CalibrationError::structural(format!(
                    "sensitivity to {curve} has length {}, cannot add length {}",
                    existing.len(),
                    values.len()
                )))
            }
            Some(existing) => {
                *existing += values;
                Ok(())
            }
            None => {
                self.sensitivities.insert(curve, values);
                Ok(())
            }
        }
    }

    /// Entry of a curve.
    #[must_use]
    pub fn get(&self, curve: &str) -> Option<&DVector<f64>> {
        self.sensitivities.get(curve)
    }

    /// Entries in curve name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DVector<f64>)> {
        self.sensitivities.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Curve names in order.
    #[must_use]
    pub fn curve_names(&self) -> Vec<String> {
        self.sensitivities.keys().cloned().collect()
    }

    /// Sum of every entry.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.sensitivities.values().map(|v| v.sum()).sum()
    }

    /// Returns true if there is no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensitivities.is_empty()
    }
}

/// Sensitivity of a value to the parameters of calibrated curves.
///
/// Only curves present in the building block bundle are reported; the rest
/// of the provider is treated as fixed.
#[derive(Debug)]
pub struct ParameterSensitivityCalculator<'a> {
    sensitivity: &'a dyn CurveSensitivityCalculator,
}

impl<'a> ParameterSensitivityCalculator<'a> {
    /// Wraps the curve sensitivity calculator of the value.
    #[must_use]
    pub fn new(sensitivity: &'a dyn CurveSensitivityCalculator) -> Self {
        Self { sensitivity }
    }

    /// `d value / d parameters` per curve of `blocks`.
    pub fn calculate(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
        blocks: &CurveBuildingBlockBundle,
    ) -> CalibrationResult<ParameterSensitivity> {
        let points = self.sensitivity.evaluate(instrument, curves)?;
        let mut result = ParameterSensitivity::new();
        for name in blocks.curve_names() {
            let Some(entry) = blocks.get(&name) else {
                continue;
            };
            let Some(start) = entry.rows.start(&name) else {
                continue;
            };
            let row = sensitivity_to_parameters(&points, curves, &entry.rows)?;
            let count = entry.rows.count(&name).unwrap_or(0);
            let own = row.rows(start, count).into_owned();
            if own.iter().any(|v| *v != 0.0) {
                result.add(name, own)?;
            }
        }
        Ok(result)
    }
}

/// Sensitivity of a value to the calibration market quotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketQuoteSensitivityCalculator;

impl MarketQuoteSensitivityCalculator {
    /// Creates the calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Converts parameter sensitivities to market quote sensitivities.
    ///
    /// Every curve of `parameters` must have an entry in `blocks`.
    pub fn from_parameter_sensitivity(
        &self,
        parameters: &ParameterSensitivity,
        blocks: &CurveBuildingBlockBundle,
    ) -> CalibrationResult<ParameterSensitivity> {
        let mut result = ParameterSensitivity::new();
        for (curve, sensitivity) in parameters.iter() {
            let entry = blocks.get(curve).ok_or_else(|| {
                CalibrationError::structural(format!("no building block for curve {curve}"))
            })?;
            let quotes = entry.to_market_quotes(curve, sensitivity)?;
            for (name, start, count) in entry.columns.iter() {
                result.add(name, quotes.rows(start, count).into_owned())?;
            }
        }
        Ok(result)
    }

    /// Market quote sensitivity of an instrument.
    pub fn calculate(
        &self,
        instrument: &InstrumentDerivative,
        curves: &MulticurveProvider,
        sensitivity: &dyn CurveSensitivityCalculator,
        blocks: &CurveBuildingBlockBundle,
    ) -> CalibrationResult<ParameterSensitivity> {
        let parameters =
            ParameterSensitivityCalculator::new(sensitivity).calculate(instrument, curves, blocks)?;
        self.from_parameter_sensitivity(&parameters, blocks)
    }
}
