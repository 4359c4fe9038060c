use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::NaiveDate;

use super::*;
use crate::curves::{Curve, InterpolatedCurve, InterpolationMethod, PriceIndexCurve, YieldCurve};
use crate::fx::FxMatrix;
use crate::index::{Currency, FloatingIndex, IndexIbor, IndexOn, IndexPrice};
use crate::instruments::{
    DefinitionConverter, FixedFloatSwapDefinition, FixingMap, InstrumentConverter,
    InstrumentDefinition, InstrumentTemplate,
};
use crate::provider::CurveBindings;
use crate::time::{DayCount, FixingSeries, Tenor};

const DSC: &str = "USD-DSC";
const FWD: &str = "USD-FWD3M";
const CPI: &str = "USD-CPI";

const DSC_TIMES: [f64; 4] = [0.5, 1.0, 2.0, 5.0];
const DSC_RATES: [f64; 4] = [0.050, 0.048, 0.045, 0.042];
const FWD_TIMES: [f64; 3] = [0.25, 1.0, 5.0];
const FWD_RATES: [f64; 3] = [0.052, 0.050, 0.046];
const CPI_TIMES: [f64; 2] = [1.0, 5.0];
const CPI_LEVELS: [f64; 2] = [315.0, 345.0];

fn valuation() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn usd() -> Currency {
    Currency::new("USD")
}

fn sofr() -> IndexOn {
    IndexOn::new("SOFR", usd(), DayCount::Act360)
}

fn libor() -> IndexIbor {
    IndexIbor::new("USD-LIBOR-3M", usd(), Tenor::Months(3), DayCount::Act360)
}

fn cpi() -> IndexPrice {
    IndexPrice::new("US-CPI-U", usd())
}

fn bindings() -> CurveBindings {
    CurveBindings::new()
        .with_discounting(usd(), DSC)
        .with_forward_on(&sofr(), DSC)
        .with_forward_ibor(&libor(), FWD)
        .with_price_index(&cpi(), CPI)
}

fn provider(dsc: &[f64], fwd: &[f64], levels: &[f64]) -> MulticurveProvider {
    let yield_curve = |name: &str, xs: &[f64], ys: &[f64]| {
        Curve::Yield(Arc::new(YieldCurve::new(
            name,
            InterpolatedCurve::new(xs.to_vec(), ys.to_vec(), InterpolationMethod::Linear).unwrap(),
        )))
    };
    let index_curve = Curve::PriceIndex(Arc::new(PriceIndexCurve::new(
        CPI,
        InterpolatedCurve::new(CPI_TIMES.to_vec(), levels.to_vec(), InterpolationMethod::LogLinear)
            .unwrap(),
    )));
    let eur = Currency::new("EUR");
    MulticurveProvider::new()
        .with_fx(FxMatrix::new(usd()).with_currency(eur, &usd(), 1.1).unwrap())
        .with_bindings(&bindings())
        .unwrap()
        .with_curve(yield_curve(DSC, &DSC_TIMES, dsc))
        .unwrap()
        .with_curve(yield_curve(FWD, &FWD_TIMES, fwd))
        .unwrap()
        .with_curve(index_curve)
        .unwrap()
}

fn base_provider() -> MulticurveProvider {
    provider(&DSC_RATES, &FWD_RATES, &CPI_LEVELS)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Swaps whose current floating period started before the valuation date.
fn started_swaps() -> Vec<InstrumentDefinition> {
    let swap = |start, maturity, fixed_period, index, floating_period| {
        InstrumentDefinition::FixedFloatSwap(FixedFloatSwapDefinition {
            currency: usd(),
            start_date: start,
            maturity_date: maturity,
            fixed_period,
            fixed_day_count: DayCount::Act360,
            floating_index: index,
            floating_period,
            rate: 0.046,
            notional: 1.0,
        })
    };
    vec![
        swap(
            date(2024, 1, 10),
            date(2026, 1, 10),
            Tenor::Years(1),
            FloatingIndex::Overnight(sofr()),
            Tenor::Years(1),
        ),
        swap(
            date(2023, 7, 10),
            date(2026, 7, 10),
            Tenor::Months(6),
            FloatingIndex::Ibor(libor()),
            Tenor::Months(3),
        ),
    ]
}

fn fixings() -> FixingMap {
    let mut fixings = FixingMap::new();
    fixings.insert(
        cpi().name,
        FixingSeries::new().with_fixing(date(2023, 10, 15), 307.0),
    );
    fixings.insert(
        sofr().name,
        FixingSeries::new()
            .with_fixing(date(2024, 1, 10), 0.0531)
            .with_fixing(date(2024, 1, 11), 0.0532)
            .with_fixing(date(2024, 1, 12), 0.0530),
    );
    fixings.insert(
        libor().name,
        FixingSeries::new().with_fixing(date(2024, 1, 10), 0.0565),
    );
    fixings
}

fn instruments() -> Vec<InstrumentDerivative> {
    let v = valuation();
    let fixings = fixings();
    let mut definitions: Vec<InstrumentDefinition> = vec![
        InstrumentTemplate::Deposit { currency: usd(), day_count: DayCount::Act360 }
            .generate(v, Tenor::Months(6), 0.049, 1.0)
            .unwrap(),
        InstrumentTemplate::Fra { index: libor() }
            .generate(v, Tenor::Months(6), 0.051, 1_000_000.0)
            .unwrap(),
        InstrumentTemplate::FixedFloatSwap {
            fixed_period: Tenor::Years(1),
            fixed_day_count: DayCount::Act360,
            floating_index: FloatingIndex::Overnight(sofr()),
            floating_period: Tenor::Years(1),
        }
        .generate(v, Tenor::Years(3), 0.045, 1.0)
        .unwrap(),
        InstrumentTemplate::FixedFloatSwap {
            fixed_period: Tenor::Months(6),
            fixed_day_count: DayCount::Act360,
            floating_index: FloatingIndex::Ibor(libor()),
            floating_period: Tenor::Months(3),
        }
        .generate(v, Tenor::Years(4), 0.047, 100.0)
        .unwrap(),
        InstrumentTemplate::BasisSwap {
            spread_index: FloatingIndex::Overnight(sofr()),
            spread_period: Tenor::Months(3),
            other_index: FloatingIndex::Ibor(libor()),
            other_period: Tenor::Months(3),
        }
        .generate(v, Tenor::Years(2), 0.0025, 1.0)
        .unwrap(),
        InstrumentTemplate::Bill { currency: usd() }
            .generate(v, Tenor::Months(9), 0.965, 1.0)
            .unwrap(),
        InstrumentTemplate::ZeroCouponInflationSwap { index: cpi(), lag_months: 3 }
            .generate(v, Tenor::Years(4), 0.027, 1.0)
            .unwrap(),
    ];
    definitions.extend(started_swaps());
    definitions
        .iter()
        .map(|d| DefinitionConverter.to_derivative(d, v, &fixings).unwrap())
        .collect()
}

/// Sensitivity mapped onto (DSC, FWD, CPI) node values.
fn to_nodes(sensitivity: &CurveSensitivity, curves: &MulticurveProvider) -> Vec<Vec<f64>> {
    [DSC, FWD, CPI]
        .iter()
        .map(|name| {
            let curve = curves.curve(name).unwrap();
            let mut nodes = vec![0.0; curve.number_of_parameters()];
            for (t, s) in sensitivity.get(name) {
                for (k, p) in curve.parameter_sensitivity(*t).unwrap().iter().enumerate() {
                    nodes[k] += s * p;
                }
            }
            nodes
        })
        .collect()
}

fn bumped_value(
    calculator: &dyn PricingCalculator,
    instrument: &InstrumentDerivative,
    curve: usize,
    node: usize,
    h: f64,
) -> f64 {
    let mut nodes = [DSC_RATES.to_vec(), FWD_RATES.to_vec(), CPI_LEVELS.to_vec()];
    nodes[curve][node] += h;
    calculator
        .evaluate(instrument, &provider(&nodes[0], &nodes[1], &nodes[2]))
        .unwrap()
}

fn check_against_bumps(pair: &CalculatorPair, scale_tolerance: f64) {
    let curves = base_provider();
    for instrument in instruments() {
        let analytic = to_nodes(&pair.sensitivity().evaluate(&instrument, &curves).unwrap(), &curves);
        for (curve, nodes) in analytic.iter().enumerate() {
            let h = if curve == 2 { 1e-4 } else { 1e-7 };
            for (node, expected) in nodes.iter().enumerate() {
                let up = bumped_value(pair.value(), &instrument, curve, node, h);
                let down = bumped_value(pair.value(), &instrument, curve, node, -h);
                let numeric = (up - down) / (2.0 * h);
                assert_relative_eq!(
                    *expected,
                    numeric,
                    epsilon = scale_tolerance,
                    max_relative = 1e-5
                );
            }
        }
    }
}

#[test]
fn test_par_spread_sensitivities_match_bumps() {
    check_against_bumps(&CalculatorPair::par_spread(), 1e-7);
}

#[test]
fn test_present_value_sensitivities_match_bumps() {
    check_against_bumps(&CalculatorPair::present_value(), 1e-4);
}

#[test]
fn test_par_spread_quote_sensitivity_is_minus_one() {
    let curves = base_provider();
    let pair = CalculatorPair::par_spread();
    for instrument in instruments() {
        assert_relative_eq!(
            pair.value().quote_sensitivity(&instrument, &curves).unwrap(),
            -1.0
        );
    }
}

#[test]
fn test_present_value_quote_sensitivity_matches_bumps() {
    let curves = base_provider();
    let v = valuation();
    let calculator = PresentValueCalculator::new();
    let mut fixings = FixingMap::new();
    fixings.insert(
        cpi().name,
        FixingSeries::new().with_fixing(NaiveDate::from_ymd_opt(2023, 10, 15).unwrap(), 307.0),
    );
    let definitions = vec![
        InstrumentTemplate::Deposit { currency: usd(), day_count: DayCount::Act360 }
            .generate(v, Tenor::Months(6), 0.049, 1.0)
            .unwrap(),
        InstrumentTemplate::Fra { index: libor() }
            .generate(v, Tenor::Months(6), 0.051, 1.0)
            .unwrap(),
        InstrumentTemplate::Bill { currency: usd() }
            .generate(v, Tenor::Months(9), 0.965, 1.0)
            .unwrap(),
        InstrumentTemplate::ZeroCouponInflationSwap { index: cpi(), lag_months: 3 }
            .generate(v, Tenor::Years(4), 0.027, 1.0)
            .unwrap(),
    ];
    let h = 1e-6;
    for definition in definitions {
        let q = definition.market_quote();
        let price = |quote: f64| {
            let d = DefinitionConverter
                .to_derivative(&definition.with_market_quote(quote), v, &fixings)
                .unwrap();
            calculator.evaluate(&d, &curves).unwrap()
        };
        let numeric = (price(q + h) - price(q - h)) / (2.0 * h);
        let base = DefinitionConverter.to_derivative(&definition, v, &fixings).unwrap();
        let analytic = calculator.quote_sensitivity(&base, &curves).unwrap();
        assert_relative_eq!(analytic, numeric, max_relative = 1e-6);
    }
}

#[test]
fn test_par_spread_is_zero_at_implied_quote() {
    let curves = base_provider();
    let calculator = ParSpreadMarketQuoteCalculator;
    let v = valuation();
    let template = InstrumentTemplate::FixedFloatSwap {
        fixed_period: Tenor::Years(1),
        fixed_day_count: DayCount::Act360,
        floating_index: FloatingIndex::Overnight(sofr()),
        floating_period: Tenor::Years(1),
    };
    let at = |q: f64| {
        let d = template.generate(v, Tenor::Years(3), q, 1.0).unwrap();
        DefinitionConverter.to_derivative(&d, v, &FixingMap::new()).unwrap()
    };
    let spread = calculator.evaluate(&at(0.04), &curves).unwrap();
    let implied = 0.04 + spread;
    assert_relative_eq!(calculator.evaluate(&at(implied), &curves).unwrap(), 0.0, epsilon = 1e-14);
    assert_relative_eq!(
        PresentValueCalculator::new().evaluate(&at(implied), &curves).unwrap(),
        0.0,
        epsilon = 1e-14
    );
}

#[test]
fn test_reporting_currency_conversion() {
    let curves = base_provider();
    let all = instruments();
    let instrument = &all[0];
    let usd_pv = PresentValueCalculator::new().evaluate(instrument, &curves).unwrap();
    let eur_pv = PresentValueCalculator::in_currency(Currency::new("EUR"))
        .evaluate(instrument, &curves)
        .unwrap();
    assert_relative_eq!(eur_pv, usd_pv / 1.1, epsilon = 1e-15);

    let missing = PresentValueCalculator::in_currency(Currency::new("JPY")).evaluate(instrument, &curves);
    assert!(missing.is_err());
}

#[test]
fn test_missing_binding_surfaces() {
    let curves = MulticurveProvider::new();
    let err = ParSpreadMarketQuoteCalculator
        .evaluate(&instruments()[0], &curves)
        .unwrap_err();
    assert!(matches!(err, crate::error::CalibrationError::StructuralConfiguration { .. }));
}

#[test]
fn test_for_objective() {
    let pair = CalculatorPair::for_objective(CalibrationObjective::PresentValue);
    assert!(format!("{:?}", pair.value()).contains("PresentValue"));
    let pair = CalculatorPair::default();
    assert!(format!("{:?}", pair.value()).contains("ParSpread"));
}
