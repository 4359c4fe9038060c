//! Calibration instruments.
//!
//! Instruments exist in two forms:
//!
//! - [`InstrumentDefinition`]: dated contract terms, usually produced from a
//!   market quote by an [`InstrumentTemplate`]
//! - [`InstrumentDerivative`]: the same contract in model time, which is
//!   what calculators price
//!
//! An [`InstrumentConverter`] turns the first into the second as of a
//! valuation date.

mod converter;
mod definition;
mod derivative;

pub use converter::{DefinitionConverter, FixingMap, InstrumentConverter};
pub use definition::{
    BasisSwapDefinition, BillDefinition, CashDefinition, FixedFloatSwapDefinition, FraDefinition,
    InstrumentDefinition, InstrumentTemplate, ZeroCouponInflationSwapDefinition,
};
pub use derivative::{
    BasisSwap, Bill, Cash, FixedCoupon, FixedFloatSwap, FixedLeg, FloatingCoupon, FloatingLeg,
    Fra, InstrumentDerivative, InstrumentKind, ZeroCouponInflationSwap, BASIS_SWAP_RATE_GUESS,
    DEFAULT_INITIAL_GUESS,
};
