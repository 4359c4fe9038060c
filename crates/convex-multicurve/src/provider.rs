//! Named curve container with curve-role bindings.
//!
//! A [`MulticurveProvider`] is the known-data bundle of a calibration: a map
//! from curve name to curve plus the [`CurveBindings`] that say which curve
//! discounts a currency or projects an index. Curves are held in `Arc` so
//! copies are cheap and can be shared across threads.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::curves::{Curve, PriceIndexCurve, YieldCurve};
use crate::error::{CalibrationError, CalibrationResult};
use crate::fx::FxMatrix;
use crate::index::{Currency, FloatingIndex, IndexIbor, IndexOn, IndexPrice};

/// Which curve plays which role.
///
/// Keys are currencies (discounting) or index names (forward and price
/// index projection); values are curve names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveBindings {
    discounting: BTreeMap<Currency, String>,
    forward_on: BTreeMap<String, String>,
    forward_ibor: BTreeMap<String, String>,
    price_index: BTreeMap<String, String>,
}

impl CurveBindings {
    /// Creates empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the discounting curve of a currency.
    #[must_use]
    pub fn with_discounting(mut self, currency: Currency, curve: impl Into<String>) -> Self {
        self.discounting.insert(currency, curve.into());
        self
    }

    /// Binds the forward curve of an overnight index.
    #[must_use]
    pub fn with_forward_on(mut self, index: &IndexOn, curve: impl Into<String>) -> Self {
        self.forward_on.insert(index.name.clone(), curve.into());
        self
    }

    /// Binds the forward curve of a term index.
    #[must_use]
    pub fn with_forward_ibor(mut self, index: &IndexIbor, curve: impl Into<String>) -> Self {
        self.forward_ibor.insert(index.name.clone(), curve.into());
        self
    }

    /// Binds the curve of a price index.
    #[must_use]
    pub fn with_price_index(mut self, index: &IndexPrice, curve: impl Into<String>) -> Self {
        self.price_index.insert(index.name.clone(), curve.into());
        self
    }

    /// Adds all bindings of `other`; a conflicting binding is an error.
    pub fn merge(&mut self, other: &CurveBindings) -> CalibrationResult<()> {
        fn merge_map<K: Ord + Clone + fmt::Display>(
            target: &mut BTreeMap<K, String>,
            source: &BTreeMap<K, String>,
            role: &str,
        ) -> CalibrationResult<()> {
            for (key, curve) in source {
                match target.get(key) {
                    Some(existing) if existing != curve => {
                        return Err(CalibrationError::structural(format!(
                            "{role} of {key} bound to both {existing} and {curve}"
                        )));
                    }
                    Some(_) => {}
                    None => {
                        target.insert(key.clone(), curve.clone());
                    }
                }
            }
            Ok(())
        }

        merge_map(&mut self.discounting, &other.discounting, "discounting")?;
        merge_map(&mut self.forward_on, &other.forward_on, "overnight forward")?;
        merge_map(&mut self.forward_ibor, &other.forward_ibor, "ibor forward")?;
        merge_map(&mut self.price_index, &other.price_index, "price index")
    }

    /// Discounting curve name for `currency`.
    pub fn discounting_curve(&self, currency: &Currency) -> CalibrationResult<&str> {
        self.discounting
            .get(currency)
            .map(String::as_str)
            .ok_or_else(|| {
                CalibrationError::structural(format!("no discounting curve bound for {currency}"))
            })
    }

    /// Forward curve name for a floating index.
    pub fn forward_curve(&self, index: &FloatingIndex) -> CalibrationResult<&str> {
        let (map, kind) = match index {
            FloatingIndex::Overnight(_) => (&self.forward_on, "overnight"),
            FloatingIndex::Ibor(_) => (&self.forward_ibor, "ibor"),
        };
        map.get(index.name()).map(String::as_str).ok_or_else(|| {
            CalibrationError::structural(format!(
                "no {kind} forward curve bound for index {}",
                index.name()
            ))
        })
    }

    /// Curve name for a price index.
    pub fn price_index_curve(&self, index: &IndexPrice) -> CalibrationResult<&str> {
        self.price_index
            .get(&index.name)
            .map(String::as_str)
            .ok_or_else(|| {
                CalibrationError::structural(format!(
                    "no curve bound for price index {}",
                    index.name
                ))
            })
    }

    /// Returns true if no role is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discounting.is_empty()
            && self.forward_on.is_empty()
            && self.forward_ibor.is_empty()
            && self.price_index.is_empty()
    }
}

/// Named curves, role bindings and FX rates.
#[derive(Clone, Default)]
pub struct MulticurveProvider {
    curves: HashMap<String, Curve>,
    bindings: CurveBindings,
    fx: FxMatrix,
}

impl fmt::Debug for MulticurveProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulticurveProvider")
            .field("curves", &self.curve_names())
            .field("bindings", &self.bindings)
            .field("fx_base", self.fx.base())
            .finish()
    }
}

impl MulticurveProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the FX matrix.
    #[must_use]
    pub fn with_fx(mut self, fx: FxMatrix) -> Self {
        self.fx = fx;
        self
    }

    /// Adds role bindings.
    pub fn with_bindings(mut self, bindings: &CurveBindings) -> CalibrationResult<Self> {
        self.bindings.merge(bindings)?;
        Ok(self)
    }

    /// Adds a curve; a name already present is a structural error.
    pub fn insert_curve(&mut self, curve: Curve) -> CalibrationResult<()> {
        let name = curve.name().to_string();
        if self.curves.contains_key(&name) {
            return Err(CalibrationError::structural(format!(
                "curve {name} is already present"
            )));
        }
        self.curves.insert(name, curve);
        Ok(())
    }

    /// Builder-style [`insert_curve`](Self::insert_curve).
    pub fn with_curve(mut self, curve: Curve) -> CalibrationResult<Self> {
        self.insert_curve(curve)?;
        Ok(self)
    }

    /// Adds every curve and binding of `other`.
    pub fn add_all(&mut self, other: &MulticurveProvider) -> CalibrationResult<()> {
        self.bindings.merge(&other.bindings)?;
        for curve in other.curves.values() {
            self.insert_curve(curve.clone())?;
        }
        Ok(())
    }

    /// Returns true if a curve of that name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    /// Curve names in sorted order.
    #[must_use]
    pub fn curve_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.curves.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Returns true if the provider holds no curve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Role bindings.
    #[must_use]
    pub fn bindings(&self) -> &CurveBindings {
        &self.bindings
    }

    /// FX rates.
    #[must_use]
    pub fn fx_matrix(&self) -> &FxMatrix {
        &self.fx
    }

    /// Curve by name.
    pub fn curve(&self, name: &str) -> CalibrationResult<&Curve> {
        self.curves
            .get(name)
            .ok_or_else(|| CalibrationError::curve_not_found(name))
    }

    /// Yield curve by name.
    pub fn yield_curve(&self, name: &str) -> CalibrationResult<&Arc<YieldCurve>> {
        self.curve(name)?.as_yield().ok_or_else(|| {
            CalibrationError::invalid_curve(name, "expected a yield curve")
        })
    }

    /// Price index curve by name.
    pub fn price_index_curve(&self, name: &str) -> CalibrationResult<&Arc<PriceIndexCurve>> {
        self.curve(name)?.as_price_index().ok_or_else(|| {
            CalibrationError::invalid_curve(name, "expected a price index curve")
        })
    }

    /// Discounting curve of a currency.
    pub fn discount_curve(&self, currency: &Currency) -> CalibrationResult<&Arc<YieldCurve>> {
        self.yield_curve(self.bindings.discounting_curve(currency)?)
    }

    /// Forward curve of a floating index.
    pub fn forward_curve(&self, index: &FloatingIndex) -> CalibrationResult<&Arc<YieldCurve>> {
        self.yield_curve(self.bindings.forward_curve(index)?)
    }

    /// Curve of a price index.
    pub fn price_index_curve_for(
        &self,
        index: &IndexPrice,
    ) -> CalibrationResult<&Arc<PriceIndexCurve>> {
        self.price_index_curve(self.bindings.price_index_curve(index)?)
    }
}
