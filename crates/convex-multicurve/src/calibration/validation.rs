//! Structural checks run before any Newton iteration.

use std::collections::HashSet;

use crate::calibration::{CalibrationBlock, CurveUnit};
use crate::error::{CalibrationError, CalibrationResult};
use crate::provider::MulticurveProvider;

/// Checks a block against the known data it will be calibrated on.
///
/// Rejects empty blocks and units, duplicate or already known curve names,
/// non-square units, initial guesses of the wrong length, and instruments or
/// generators reading curves that are unknown or only calibrated later in
/// the block.
pub fn validate_block(block: &CalibrationBlock, known: &MulticurveProvider) -> CalibrationResult<()> {
    if block.units().is_empty() {
        return Err(CalibrationError::structural("calibration block has no unit"));
    }

    let mut names = HashSet::new();
    for name in block.curve_names() {
        if known.contains(&name) {
            return Err(CalibrationError::structural(format!(
                "curve {name} is already part of the known data"
            )));
        }
        if !names.insert(name.clone()) {
            return Err(CalibrationError::structural(format!(
                "curve {name} appears more than once in the block"
            )));
        }
    }

    let later: Vec<Vec<String>> = block.units().iter().map(CurveUnit::curve_names).collect();
    let mut available: HashSet<String> = HashSet::new();
    for (k, unit) in block.units().iter().enumerate() {
        validate_unit(unit)?;
        let unit_names = &later[k];

        // Curves are generated in declared order, so a generator only sees
        // the curves declared before it in its own unit.
        for (j, curve) in unit.curves().iter().enumerate() {
            for required in curve.generator.required_curves() {
                if known.contains(&required)
                    || available.contains(&required)
                    || unit_names[..j].contains(&required)
                {
                    continue;
                }
                if later[k..].iter().flatten().any(|n| *n == required) {
                    return Err(CalibrationError::structural(format!(
                        "curve {} of unit {k} is built on {required} before it is calibrated (forward reference)",
                        curve.name
                    )));
                }
                return Err(CalibrationError::structural(format!(
                    "curve {} of unit {k} is built on unknown curve {required}",
                    curve.name
                )));
            }
        }

        available.extend(unit_names.iter().cloned());
        for required in instrument_curves(unit, known)? {
            if known.contains(&required) || available.contains(&required) {
                continue;
            }
            if later[k + 1..].iter().flatten().any(|n| *n == required) {
                return Err(CalibrationError::structural(format!(
                    "unit {k} reads curve {required} before it is calibrated (forward reference)"
                )));
            }
            return Err(CalibrationError::structural(format!(
                "unit {k} reads unknown curve {required}"
            )));
        }
    }
    Ok(())
}

/// Checks that a unit is a non-empty square system with a matching guess.
pub fn validate_unit(unit: &CurveUnit) -> CalibrationResult<()> {
    if unit.curves().is_empty() {
        return Err(CalibrationError::structural("curve unit has no curve"));
    }
    let parameters = unit.number_of_parameters();
    let instruments = unit.number_of_instruments();
    if parameters != instruments {
        return Err(CalibrationError::structural(format!(
            "unit {:?} has {parameters} parameters but {instruments} instruments",
            unit.curve_names()
        )));
    }
    if parameters == 0 {
        return Err(CalibrationError::structural(format!(
            "unit {:?} has nothing to calibrate",
            unit.curve_names()
        )));
    }
    let guess = unit.initial_guess().len();
    if guess != parameters {
        return Err(CalibrationError::structural(format!(
            "unit {:?} has {parameters} parameters but an initial guess of length {guess}",
            unit.curve_names()
        )));
    }
    Ok(())
}

fn instrument_curves(unit: &CurveUnit, known: &MulticurveProvider) -> CalibrationResult<Vec<String>> {
    let mut names = Vec::new();
    for curve in unit.curves() {
        for instrument in &curve.instruments {
            names.extend(instrument.required_curves(known.bindings())?);
        }
    }
    names.sort();
    names.dedup();
    Ok(names)
}
