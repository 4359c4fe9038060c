//! Currencies and rate indices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::{DayCount, Tenor};

/// ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Creates a currency from its code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Overnight index (SOFR, ESTR, SONIA, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexOn {
    /// Index name, used as the forward binding key.
    pub name: String,
    /// Currency of the index.
    pub currency: Currency,
    /// Accrual convention.
    pub day_count: DayCount,
}

impl IndexOn {
    /// Creates an overnight index.
    #[must_use]
    pub fn new(name: impl Into<String>, currency: Currency, day_count: DayCount) -> Self {
        Self {
            name: name.into(),
            currency,
            day_count,
        }
    }
}

/// Term rate index (LIBOR-style, EURIBOR, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexIbor {
    /// Index name, used as the forward binding key.
    pub name: String,
    /// Currency of the index.
    pub currency: Currency,
    /// Fixing tenor.
    pub tenor: Tenor,
    /// Accrual convention.
    pub day_count: DayCount,
}

impl IndexIbor {
    /// Creates a term index.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        currency: Currency,
        tenor: Tenor,
        day_count: DayCount,
    ) -> Self {
        Self {
            name: name.into(),
            currency,
            tenor,
            day_count,
        }
    }
}

/// Consumer price index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexPrice {
    /// Index name, used as the price index binding key.
    pub name: String,
    /// Currency of the index.
    pub currency: Currency,
}

impl IndexPrice {
    /// Creates a price index.
    #[must_use]
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self {
            name: name.into(),
            currency,
        }
    }
}

/// Index paid by a floating leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatingIndex {
    /// Compounded overnight rate, forwarded on the overnight curve.
    Overnight(IndexOn),
    /// Term rate.
    Ibor(IndexIbor),
}

impl FloatingIndex {
    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            FloatingIndex::Overnight(index) => &index.name,
            FloatingIndex::Ibor(index) => &index.name,
        }
    }

    /// Index currency.
    #[must_use]
    pub fn currency(&self) -> &Currency {
        match self {
            FloatingIndex::Overnight(index) => &index.currency,
            FloatingIndex::Ibor(index) => &index.currency,
        }
    }

    /// Accrual convention.
    #[must_use]
    pub fn day_count(&self) -> DayCount {
        match self {
            FloatingIndex::Overnight(index) => index.day_count,
            FloatingIndex::Ibor(index) => index.day_count,
        }
    }
}
