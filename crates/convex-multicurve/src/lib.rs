//! # Convex Multicurve
//!
//! Simultaneous calibration of discounting, forward and price index curves.
//!
//! This crate provides:
//!
//! - **Curves**: yield curves on zero rates, price index curves with
//!   seasonality, all exposing their parameter sensitivities
//! - **Generators**: parameter vector to curve maps, with seasonality and
//!   existing-curve decorators
//! - **Instruments**: deposits, FRAs, fixed/floating and basis swaps, bills
//!   and zero-coupon inflation swaps, as dated definitions and model-time
//!   derivatives
//! - **Calculators**: par spread and present value objectives with analytic
//!   curve sensitivities
//! - **Calibration**: Newton solves per unit, blocks of units, building block
//!   Jacobians and market quote sensitivities
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use convex_multicurve::prelude::*;
//!
//! let valuation = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let usd = Currency::new("USD");
//! let deposits = InstrumentTemplate::Deposit { currency: usd.clone(), day_count: DayCount::Act360 }
//!     .generate_strip(valuation, &[(Tenor::Months(3), 0.053), (Tenor::Months(6), 0.052)], 1.0)
//!     .unwrap();
//!
//! let generator = Arc::new(GeneratorYieldInterpolated::new(
//!     MaturityCalculator::LastPaymentTime,
//!     InterpolationMethod::Linear,
//! ));
//! let block = BlockDefinition::new(vec![UnitDefinition::new(vec![CurveDefinition::new(
//!     "USD-DSC", generator, deposits,
//! )])]);
//!
//! let repository = CurveBuildingRepository::new(CalibrationConfig::default()).unwrap();
//! let result = repository
//!     .make_curves_from_definitions(
//!         &[block],
//!         &DefinitionContext::new(valuation),
//!         &MulticurveProvider::new(),
//!         &CurveBindings::new().with_discounting(usd, "USD-DSC"),
//!         &repository.default_calculators(),
//!     )
//!     .unwrap();
//!
//! let df = result.provider.yield_curve("USD-DSC").unwrap().discount_factor(0.5).unwrap();
//! assert!(df < 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]

pub mod calculators;
pub mod calibration;
pub mod config;
pub mod curves;
pub mod error;
pub mod fx;
pub mod generator;
pub mod index;
pub mod instruments;
pub mod provider;
pub mod sensitivity;
pub mod time;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calculators::{
        CalculatorPair, CalibrationObjective, CurveSensitivityCalculator, PricingCalculator,
    };
    pub use crate::calibration::{
        BlockDefinition, CalibratedCurves, CalibrationBlock, CurveBuildingBlockBundle,
        CurveBuildingRepository, CurveDefinition, CurveUnit, DefinitionContext,
        MarketQuoteSensitivityCalculator, ParameterSensitivity, ParameterSensitivityCalculator,
        UnitDefinition,
    };
    pub use crate::config::{BlockExecution, CalibrationConfig};
    pub use crate::curves::{
        Curve, InterpolatedCurve, InterpolationMethod, PriceIndexCurve, SeasonalCurve, YieldCurve,
    };
    pub use crate::error::{CalibrationError, CalibrationResult};
    pub use crate::fx::FxMatrix;
    pub use crate::generator::{
        CurveGenerator, GeneratorDecorated, GeneratorPriceIndexInterpolated,
        GeneratorYieldInterpolated, MaturityCalculator,
    };
    pub use crate::index::{Currency, FloatingIndex, IndexIbor, IndexOn, IndexPrice};
    pub use crate::instruments::{
        DefinitionConverter, FixingMap, InstrumentConverter, InstrumentDefinition,
        InstrumentDerivative, InstrumentTemplate,
    };
    pub use crate::provider::{CurveBindings, MulticurveProvider};
    pub use crate::sensitivity::CurveSensitivity;
    pub use crate::time::{DayCount, FixingSeries, Tenor};
}

pub use calibration::{CalibratedCurves, CurveBuildingRepository};
pub use error::{CalibrationError, CalibrationResult};
pub use provider::MulticurveProvider;
