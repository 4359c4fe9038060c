//! Point sensitivities to curves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sensitivity of a value to curve points.
///
/// For each curve name, a list of `(time, sensitivity)` pairs. On a yield
/// curve the sensitivity is to the continuously compounded zero rate at that
/// time; on a price index curve it is to the index level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveSensitivity {
    sensitivities: BTreeMap<String, Vec<(f64, f64)>>,
}

impl CurveSensitivity {
    /// Creates an empty sensitivity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single point sensitivity.
    #[must_use]
    pub fn of(curve: impl Into<String>, time: f64, value: f64) -> Self {
        let mut s = Self::new();
        s.add(curve, time, value);
        s
    }

    /// Adds a point.
    pub fn add(&mut self, curve: impl Into<String>, time: f64, value: f64) {
        self.sensitivities
            .entry(curve.into())
            .or_default()
            .push((time, value));
    }

    /// Sum of two sensitivities.
    #[must_use]
    pub fn plus(mut self, other: CurveSensitivity) -> Self {
        for (curve, points) in other.sensitivities {
            self.sensitivities.entry(curve).or_default().extend(points);
        }
        self
    }

    /// Scales every point by `factor`.
    #[must_use]
    pub fn multiplied_by(mut self, factor: f64) -> Self {
        for points in self.sensitivities.values_mut() {
            for (_, value) in points.iter_mut() {
                *value *= factor;
            }
        }
        self
    }

    /// Points on one curve.
    #[must_use]
    pub fn get(&self, curve: &str) -> &[(f64, f64)] {
        self.sensitivities.get(curve).map_or(&[][..], Vec::as_slice)
    }

    /// Iterates over curves and their points.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(f64, f64)])> {
        self.sensitivities
            .iter()
            .map(|(name, points)| (name.as_str(), points.as_slice()))
    }

    /// Curve names with at least one point.
    pub fn curve_names(&self) -> impl Iterator<Item = &str> {
        self.sensitivities.keys().map(String::as_str)
    }

    /// Returns true if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensitivities.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_and_scale() {
        let a = CurveSensitivity::of("DSC", 1.0, 2.0);
        let b = CurveSensitivity::of("DSC", 2.0, 3.0).plus(CurveSensitivity::of("FWD", 0.5, 1.0));
        let total = a.plus(b).multiplied_by(-1.0);

        assert_eq!(total.get("DSC"), &[(1.0, -2.0), (2.0, -3.0)]);
        assert_eq!(total.get("FWD"), &[(0.5, -1.0)]);
        assert!(total.get("CPI").is_empty());
        assert_eq!(total.curve_names().collect::<Vec<_>>(), vec!["DSC", "FWD"]);
    }

    #[test]
    fn test_empty() {
        assert!(CurveSensitivity::new().is_empty());
        assert!(!CurveSensitivity::of("X", 0.0, 0.0).is_empty());
    }
}
