//! Node placement for interpolated generators.

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};
use crate::instruments::InstrumentDerivative;

/// Maps an instrument to the curve node it pins down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaturityCalculator {
    /// Last payment or fixing period end.
    #[default]
    LastPaymentTime,
    /// Last index reference; used for price index curves.
    LastFixingStartTime,
}

impl MaturityCalculator {
    /// Node time for one instrument.
    #[must_use]
    pub fn maturity(self, instrument: &InstrumentDerivative) -> f64 {
        match self {
            MaturityCalculator::LastPaymentTime => instrument.last_payment_time(),
            MaturityCalculator::LastFixingStartTime => instrument.last_fixing_start_time(),
        }
    }
}

/// Where an interpolated generator takes its nodes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeSource {
    /// One node per instrument, placed by the calculator. Replaced by
    /// [`NodeSource::Fixed`] when the generator is finalised.
    Maturities(MaturityCalculator),
    /// Explicit node times.
    Fixed(Vec<f64>),
}

impl NodeSource {
    /// Number of parameters, zero until nodes are known.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            NodeSource::Maturities(_) => 0,
            NodeSource::Fixed(nodes) => nodes.len(),
        }
    }

    /// Returns true if no node is known yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node times, failing if the source was never finalised.
    pub fn nodes(&self) -> CalibrationResult<&[f64]> {
        match self {
            NodeSource::Fixed(nodes) => Ok(nodes),
            NodeSource::Maturities(_) => Err(CalibrationError::structural(
                "generator used before its nodes were fixed from instruments",
            )),
        }
    }

    /// Resolves node times from the instruments of the curve.
    pub fn finalise(&self, instruments: &[InstrumentDerivative]) -> CalibrationResult<NodeSource> {
        match self {
            NodeSource::Fixed(_) => Ok(self.clone()),
            NodeSource::Maturities(calculator) => {
                if instruments.is_empty() {
                    return Err(CalibrationError::structural(
                        "cannot place curve nodes without instruments",
                    ));
                }
                let nodes: Vec<f64> = instruments.iter().map(|i| calculator.maturity(i)).collect();
                if let Some(w) = nodes.windows(2).find(|w| w[1] <= w[0]) {
                    return Err(CalibrationError::structural(format!(
                        "instrument maturities must be strictly increasing ({} after {})",
                        w[1], w[0]
                    )));
                }
                Ok(NodeSource::Fixed(nodes))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Currency;
    use crate::instruments::Cash;

    fn deposit(end: f64) -> InstrumentDerivative {
        InstrumentDerivative::Cash(Cash {
            currency: Currency::new("USD"),
            start_time: 0.0,
            end_time: end,
            accrual_factor: end,
            rate: 0.05,
            notional: 1.0,
        })
    }

    #[test]
    fn test_finalise_places_nodes_at_maturities() {
        let source = NodeSource::Maturities(MaturityCalculator::LastPaymentTime);
        assert!(source.nodes().is_err());
        let fixed = source.finalise(&[deposit(0.5), deposit(1.0)]).unwrap();
        assert_eq!(fixed.nodes().unwrap(), &[0.5, 1.0]);
        assert_eq!(fixed.finalise(&[deposit(3.0)]).unwrap(), fixed);
    }

    #[test]
    fn test_unsorted_maturities_rejected() {
        let source = NodeSource::Maturities(MaturityCalculator::LastPaymentTime);
        assert!(matches!(
            source.finalise(&[deposit(1.0), deposit(1.0)]),
            Err(CalibrationError::StructuralConfiguration { .. })
        ));
        assert!(source.finalise(&[]).is_err());
    }
}
