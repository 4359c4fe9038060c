//! Jacobian bookkeeping for market quote risk.
//!
//! Each calibrated curve keeps the matrices of the unit that produced it:
//!
//! - the square unit Jacobian `d objective / d parameters`
//! - the transition matrix `d parameters / d market quotes`, whose columns
//!   span every curve calibrated so far in the block
//!
//! A [`CurveBuildingBlock`] records which rows or columns belong to which
//! curve.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};

/// Ordered `(curve, start, count)` layout of a matrix dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveBuildingBlock {
    entries: Vec<(String, usize, usize)>,
}

impl CurveBuildingBlock {
    /// Creates an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a curve occupying `count` positions.
    pub fn push(&mut self, curve: impl Into<String>, count: usize) {
        let start = self.total();
        self.entries.push((curve.into(), start, count));
    }

    /// Appends every entry of `other`, shifted after this layout.
    pub fn extend(&mut self, other: &CurveBuildingBlock) {
        for (name, _, count) in &other.entries {
            self.push(name.clone(), *count);
        }
    }

    /// Start position of a curve.
    #[must_use]
    pub fn start(&self, curve: &str) -> Option<usize> {
        self.find(curve).map(|(_, start, _)| *start)
    }

    /// Number of positions of a curve.
    #[must_use]
    pub fn count(&self, curve: &str) -> Option<usize> {
        self.find(curve).map(|(_, _, count)| *count)
    }

    /// Total size of the dimension.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.last().map_or(0, |(_, start, count)| start + count)
    }

    /// Curve names in layout order.
    #[must_use]
    pub fn curve_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _, _)| name.clone()).collect()
    }

    /// Entries in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize, usize)> {
        self.entries
            .iter()
            .map(|(name, start, count)| (name.as_str(), *start, *count))
    }

    /// Returns true if the curve appears in the layout.
    #[must_use]
    pub fn contains(&self, curve: &str) -> bool {
        self.find(curve).is_some()
    }

    /// Returns true if the layout is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, curve: &str) -> Option<&(String, usize, usize)> {
        self.entries.iter().find(|(name, _, _)| name == curve)
    }
}

/// Matrices recorded for one calibrated curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveBuildingBlockEntry {
    /// Market quote layout of the transition matrix columns.
    pub columns: CurveBuildingBlock,
    /// Parameter layout of the producing unit (rows of both matrices).
    pub rows: CurveBuildingBlock,
    /// `d parameters / d market quotes` for the unit's parameters.
    pub transition: DMatrix<f64>,
    /// Unit Jacobian `d objective / d parameters` at the solution.
    pub jacobian: DMatrix<f64>,
}

impl CurveBuildingBlockEntry {
    /// Rows of the transition matrix belonging to `curve`.
    pub fn curve_rows(&self, curve: &str) -> CalibrationResult<DMatrix<f64>> {
        let (start, count) = self
            .rows
            .start(curve)
            .zip(self.rows.count(curve))
            .ok_or_else(|| {
                CalibrationError::structural(format!(
                    "curve {curve} is not part of this building block"
                ))
            })?;
        Ok(self.transition.rows(start, count).into_owned())
    }

    /// Maps `d value / d parameters` of `curve` onto the market quotes.
    ///
    /// The result follows the column layout.
    pub fn to_market_quotes(
        &self,
        curve: &str,
        parameter_sensitivity: &DVector<f64>,
    ) -> CalibrationResult<DVector<f64>> {
        let rows = self.curve_rows(curve)?;
        if rows.nrows() != parameter_sensitivity.len() {
            return Err(CalibrationError::structural(format!(
                "curve {curve} has {} parameters but the sensitivity has {}",
                rows.nrows(),
                parameter_sensitivity.len()
            )));
        }
        Ok(rows.transpose() * parameter_sensitivity)
    }
}

/// Building block entries keyed by curve name.
#[derive(Debug, Clone, Default)]
pub struct CurveBuildingBlockBundle {
    entries: HashMap<String, CurveBuildingBlockEntry>,
}

impl CurveBuildingBlockBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the entry of one curve, replacing any earlier one.
    pub fn add(&mut self, curve: impl Into<String>, entry: CurveBuildingBlockEntry) {
        self.entries.insert(curve.into(), entry);
    }

    /// Entry of a curve.
    #[must_use]
    pub fn get(&self, curve: &str) -> Option<&CurveBuildingBlockEntry> {
        self.entries.get(curve)
    }

    /// Adds every entry of `other`.
    pub fn add_all(&mut self, other: &CurveBuildingBlockBundle) {
        for (name, entry) in &other.entries {
            self.entries.insert(name.clone(), entry.clone());
        }
    }

    /// Returns true if the curve has an entry.
    #[must_use]
    pub fn contains(&self, curve: &str) -> bool {
        self.entries.contains_key(curve)
    }

    /// Curve names in sorted order.
    #[must_use]
    pub fn curve_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the bundle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn layout(curves: &[(&str, usize)]) -> CurveBuildingBlock {
        let mut block = CurveBuildingBlock::new();
        for (name, count) in curves {
            block.push(*name, *count);
        }
        block
    }

    #[test]
    fn test_layout_positions() {
        let mut block = layout(&[("DSC", 3), ("FWD", 2)]);
        assert_eq!(block.start("FWD"), Some(3));
        assert_eq!(block.count("DSC"), Some(3));
        assert_eq!(block.total(), 5);
        assert_eq!(block.start("CPI"), None);

        block.extend(&layout(&[("CPI", 4)]));
        assert_eq!(block.start("CPI"), Some(5));
        assert_eq!(block.curve_names(), vec!["DSC", "FWD", "CPI"]);
    }

    #[test]
    fn test_layout_serde() {
        let block = layout(&[("DSC", 2)]);
        let json = serde_json::to_string(&block).unwrap();
        let back: CurveBuildingBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn test_entry_maps_to_market_quotes() {
        let entry = CurveBuildingBlockEntry {
            columns: layout(&[("DSC", 1), ("FWD", 2)]),
            rows: layout(&[("FWD", 2)]),
            transition: DMatrix::from_row_slice(2, 3, &[0.1, 1.0, 0.0, 0.2, 0.5, 2.0]),
            jacobian: DMatrix::identity(2, 2),
        };
        let mq = entry
            .to_market_quotes("FWD", &DVector::from_vec(vec![1.0, 10.0]))
            .unwrap();
        assert_relative_eq!(mq[0], 2.1, epsilon = 1e-14);
        assert_relative_eq!(mq[1], 6.0, epsilon = 1e-14);
        assert_relative_eq!(mq[2], 20.0, epsilon = 1e-14);
        assert!(entry
            .to_market_quotes("DSC", &DVector::from_vec(vec![1.0]))
            .is_err());
    }

    #[test]
    fn test_bundle_merge() {
        let entry = CurveBuildingBlockEntry {
            columns: layout(&[("DSC", 1)]),
            rows: layout(&[("DSC", 1)]),
            transition: DMatrix::identity(1, 1),
            jacobian: DMatrix::identity(1, 1),
        };
        let mut first = CurveBuildingBlockBundle::new();
        first.add("DSC", entry.clone());
        let mut second = CurveBuildingBlockBundle::new();
        second.add("FWD", entry);
        first.add_all(&second);
        assert_eq!(first.curve_names(), vec!["DSC", "FWD"]);
        assert!(first.contains("FWD"));
        assert_eq!(first.len(), 2);
    }
}
