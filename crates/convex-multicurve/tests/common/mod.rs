//! Market data and curve definitions shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use convex_multicurve::prelude::*;

pub const DSC: &str = "USD-DSC";
pub const FWD: &str = "USD-LIBOR3M";
pub const CPI: &str = "USD-CPI";

pub const OIS_QUOTES: [(Tenor, f64); 5] = [
    (Tenor::Days(1), 0.0530),
    (Tenor::Years(1), 0.0495),
    (Tenor::Years(2), 0.0450),
    (Tenor::Years(3), 0.0425),
    (Tenor::Years(5), 0.0405),
];

pub const IBOR_QUOTES: [(Tenor, f64); 4] = [
    (Tenor::Years(1), 0.0520),
    (Tenor::Years(2), 0.0475),
    (Tenor::Years(3), 0.0450),
    (Tenor::Years(5), 0.0430),
];

pub const ZC_QUOTES: [(Tenor, f64); 3] = [
    (Tenor::Years(1), 0.0260),
    (Tenor::Years(3), 0.0245),
    (Tenor::Years(5), 0.0240),
];

pub const CPI_START: f64 = 307.5;

pub fn valuation() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

pub fn usd() -> Currency {
    Currency::new("USD")
}

pub fn sofr() -> IndexOn {
    IndexOn::new("SOFR", usd(), DayCount::Act360)
}

pub fn libor() -> IndexIbor {
    IndexIbor::new("USD-LIBOR-3M", usd(), Tenor::Months(3), DayCount::Act360)
}

pub fn cpi() -> IndexPrice {
    IndexPrice::new("US-CPI-U", usd())
}

pub fn bindings() -> CurveBindings {
    CurveBindings::new()
        .with_discounting(usd(), DSC)
        .with_forward_on(&sofr(), DSC)
        .with_forward_ibor(&libor(), FWD)
        .with_price_index(&cpi(), CPI)
}

pub fn fixings() -> FixingMap {
    let mut fixings = FixingMap::new();
    fixings.insert(
        cpi().name,
        FixingSeries::new().with_fixing(NaiveDate::from_ymd_opt(2023, 10, 15).unwrap(), CPI_START),
    );
    fixings
}

pub fn context() -> DefinitionContext {
    DefinitionContext::new(valuation()).with_fixings(fixings())
}

/// Overnight deposit followed by annual OIS.
pub fn ois_definitions(quotes: &[(Tenor, f64)]) -> Vec<InstrumentDefinition> {
    let v = valuation();
    let deposit = InstrumentTemplate::Deposit {
        currency: usd(),
        day_count: DayCount::Act360,
    };
    let ois = InstrumentTemplate::FixedFloatSwap {
        fixed_period: Tenor::Years(1),
        fixed_day_count: DayCount::Act360,
        floating_index: FloatingIndex::Overnight(sofr()),
        floating_period: Tenor::Years(1),
    };
    quotes
        .iter()
        .map(|(tenor, quote)| match tenor {
            Tenor::Days(_) => deposit.generate(v, *tenor, *quote, 1.0),
            _ => ois.generate(v, *tenor, *quote, 1.0),
        })
        .collect::<CalibrationResult<Vec<_>>>()
        .unwrap()
}

/// Semi-annual fixed against quarterly LIBOR swaps.
pub fn ibor_definitions(quotes: &[(Tenor, f64)]) -> Vec<InstrumentDefinition> {
    InstrumentTemplate::FixedFloatSwap {
        fixed_period: Tenor::Months(6),
        fixed_day_count: DayCount::Act360,
        floating_index: FloatingIndex::Ibor(libor()),
        floating_period: Tenor::Months(3),
    }
    .generate_strip(valuation(), quotes, 1.0)
    .unwrap()
}

pub fn zc_definitions(quotes: &[(Tenor, f64)]) -> Vec<InstrumentDefinition> {
    InstrumentTemplate::ZeroCouponInflationSwap {
        index: cpi(),
        lag_months: 3,
    }
    .generate_strip(valuation(), quotes, 1.0)
    .unwrap()
}

pub fn yield_generator(method: InterpolationMethod) -> Arc<dyn CurveGenerator> {
    Arc::new(GeneratorYieldInterpolated::new(
        MaturityCalculator::LastPaymentTime,
        method,
    ))
}

pub fn seasonal_cpi_generator() -> Arc<dyn CurveGenerator> {
    let steps: Vec<f64> = (0..=72).map(|m| f64::from(m) / 12.0).collect();
    let factors = [
        1.004, 1.003, 1.002, 1.001, 0.999, 0.998, 0.999, 1.000, 1.001, 0.997, 0.996,
    ];
    let seasonal = SeasonalCurve::new(steps, &factors).unwrap();
    Arc::new(GeneratorDecorated::with_seasonality(
        Arc::new(GeneratorPriceIndexInterpolated::new(InterpolationMethod::LogLinear)),
        seasonal,
    ))
}

pub fn dsc_curve(quotes: &[(Tenor, f64)]) -> CurveDefinition {
    CurveDefinition::new(
        DSC,
        yield_generator(InterpolationMethod::Linear),
        ois_definitions(quotes),
    )
}

pub fn fwd_curve(quotes: &[(Tenor, f64)]) -> CurveDefinition {
    CurveDefinition::new(
        FWD,
        yield_generator(InterpolationMethod::Linear),
        ibor_definitions(quotes),
    )
}

/// DSC and FWD solved in one unit.
pub fn joint_block(ois: &[(Tenor, f64)], ibor: &[(Tenor, f64)]) -> BlockDefinition {
    BlockDefinition::new(vec![UnitDefinition::new(vec![dsc_curve(ois), fwd_curve(ibor)])])
}

/// DSC, then FWD, as two units.
pub fn sequential_block(ois: &[(Tenor, f64)], ibor: &[(Tenor, f64)]) -> BlockDefinition {
    BlockDefinition::new(vec![
        UnitDefinition::new(vec![dsc_curve(ois)]),
        UnitDefinition::new(vec![fwd_curve(ibor)]),
    ])
}

pub fn tight_config() -> CalibrationConfig {
    CalibrationConfig::default()
        .with_function_tolerance(1e-13)
        .with_parameter_tolerance(1e-13)
}

pub fn repository(config: CalibrationConfig) -> CurveBuildingRepository {
    CurveBuildingRepository::new(config).unwrap()
}

pub fn calibrate(
    repository: &CurveBuildingRepository,
    blocks: &[BlockDefinition],
) -> CalibrationResult<CalibratedCurves> {
    repository.make_curves_from_definitions(
        blocks,
        &context(),
        &MulticurveProvider::new(),
        &bindings(),
        &repository.default_calculators(),
    )
}

/// Converted calibration instruments of a curve definition.
pub fn derivatives(curve: &CurveDefinition) -> Vec<InstrumentDerivative> {
    curve
        .instruments
        .iter()
        .map(|d| {
            DefinitionConverter::new()
                .to_derivative(d, valuation(), &fixings())
                .unwrap()
        })
        .collect()
}
