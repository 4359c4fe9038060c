//! Multi-curve calibration.
//!
//! # Structure
//!
//! - A [`CurveUnit`] is a set of curves solved as one square system: the
//!   total parameter count of its generators equals its instrument count.
//! - A [`CalibrationBlock`] is an ordered list of units. Each unit sees the
//!   known data plus the curves of the units before it.
//! - The [`CurveBuildingRepository`] runs blocks, either chained (each
//!   block's curves are known data for the next) or independently.
//!
//! # Workflow
//!
//! ```text
//! definitions ──convert──> instruments ──finalise generators──> units
//!       units ──Newton per unit──> curves + building blocks
//! ```
//!
//! Every run returns the extended [`MulticurveProvider`](crate::provider::MulticurveProvider)
//! and a [`CurveBuildingBlockBundle`] holding, per curve, the Jacobian and the
//! parameter-to-market-quote transition matrix used by the
//! [`MarketQuoteSensitivityCalculator`].

mod building_block;
mod definitions;
mod market_quote;
mod repository;
mod root_finder;
mod unit;
mod validation;

pub use building_block::{CurveBuildingBlock, CurveBuildingBlockBundle, CurveBuildingBlockEntry};
pub use definitions::{BlockDefinition, CurveDefinition, DefinitionContext, UnitDefinition};
pub use market_quote::{
    MarketQuoteSensitivityCalculator, ParameterSensitivity, ParameterSensitivityCalculator,
};
pub use repository::{CalibratedCurves, CurveBuildingRepository, UnitDiagnostics};
pub use root_finder::{
    generate_unit_curves, sensitivity_to_parameters, MulticurveRootFinder, UnitSolution,
};
pub use unit::{CalibrationBlock, CurveUnit, UnitCurve};
pub use validation::{validate_block, validate_unit};
