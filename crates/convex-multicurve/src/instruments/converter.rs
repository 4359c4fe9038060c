//! Definition to model-time conversion.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{CalibrationError, CalibrationResult};
use crate::index::FloatingIndex;
use crate::instruments::definition::{
    BasisSwapDefinition, BillDefinition, CashDefinition, FixedFloatSwapDefinition, FraDefinition,
    InstrumentDefinition, ZeroCouponInflationSwapDefinition,
};
use crate::instruments::derivative::{
    BasisSwap, Bill, Cash, FixedCoupon, FixedFloatSwap, FixedLeg, FloatingCoupon, FloatingLeg, Fra,
    InstrumentDerivative, ZeroCouponInflationSwap,
};
use crate::time::{model_time, months_between, periodic_schedule, DayCount, FixingSeries, Tenor};

/// Historical fixings keyed by index name.
pub type FixingMap = BTreeMap<String, FixingSeries>;

/// Converts dated definitions into model-time instruments.
pub trait InstrumentConverter: Send + Sync {
    /// Converts one definition as of `valuation_date`.
    fn to_derivative(
        &self,
        definition: &InstrumentDefinition,
        valuation_date: NaiveDate,
        fixings: &FixingMap,
    ) -> CalibrationResult<InstrumentDerivative>;
}

/// Default converter.
///
/// Deposits, FRAs and bills must not have started before the valuation
/// date. Swap legs drop the coupons paid on or before it and read the
/// fixings of periods already under way. Zero-coupon inflation swaps read
/// their start index from the fixings when it is not given.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionConverter;

impl DefinitionConverter {
    /// Creates the converter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn ensure_not_started(what: &str, start: NaiveDate, valuation_date: NaiveDate) -> CalibrationResult<()> {
    if start < valuation_date {
        return Err(CalibrationError::conversion(format!(
            "{what} starting {start} precedes valuation date {valuation_date}"
        )));
    }
    Ok(())
}

fn ensure_ordered(what: &str, start: NaiveDate, end: NaiveDate) -> CalibrationResult<()> {
    if end <= start {
        return Err(CalibrationError::conversion(format!(
            "{what} ends {end} on or before its start {start}"
        )));
    }
    Ok(())
}

fn ensure_outstanding(what: &str, maturity: NaiveDate, valuation_date: NaiveDate) -> CalibrationResult<()> {
    if maturity <= valuation_date {
        return Err(CalibrationError::conversion(format!(
            "{what} maturing {maturity} has no cash flow after valuation date {valuation_date}"
        )));
    }
    Ok(())
}

/// Fixed coupons paying after the valuation date.
fn fixed_leg(
    start: NaiveDate,
    maturity: NaiveDate,
    period: Tenor,
    day_count: DayCount,
    rate: f64,
    valuation_date: NaiveDate,
) -> CalibrationResult<FixedLeg> {
    let mut previous = start;
    let mut coupons = Vec::new();
    for date in periodic_schedule(start, maturity, period)? {
        if date > valuation_date {
            coupons.push(FixedCoupon {
                payment_time: model_time(valuation_date, date),
                accrual_factor: day_count.year_fraction(previous, date),
            });
        }
        previous = date;
    }
    Ok(FixedLeg { coupons, rate })
}

fn fixing_on(index: &FloatingIndex, fixings: &FixingMap, date: NaiveDate) -> CalibrationResult<f64> {
    fixings
        .get(index.name())
        .and_then(|series| series.value_at(date))
        .ok_or_else(|| {
            CalibrationError::conversion(format!("no fixing of {} on {date}", index.name()))
        })
}

/// Compounded growth of the overnight fixings from `start` up to the
/// valuation date. Each fixing accrues until the next one.
fn accrued_overnight_growth(
    index: &FloatingIndex,
    start: NaiveDate,
    valuation_date: NaiveDate,
    fixings: &FixingMap,
) -> CalibrationResult<f64> {
    let day_count = index.day_count();
    let mut growth = 1.0;
    let mut date = start;
    while date < valuation_date {
        let rate = fixing_on(index, fixings, date)?;
        let next = fixings
            .get(index.name())
            .and_then(|series| series.first_after(date))
            .map_or(valuation_date, |(d, _)| d.min(valuation_date));
        growth *= 1.0 + rate * day_count.year_fraction(date, next);
        date = next;
    }
    Ok(growth)
}

/// Floating coupons paying after the valuation date. Periods that started
/// before it take their fixings from `fixings`.
fn floating_leg(
    index: &FloatingIndex,
    start: NaiveDate,
    maturity: NaiveDate,
    period: Tenor,
    spread: f64,
    valuation_date: NaiveDate,
    fixings: &FixingMap,
) -> CalibrationResult<FloatingLeg> {
    let day_count = index.day_count();
    let mut previous = start;
    let mut coupons = Vec::new();
    for date in periodic_schedule(start, maturity, period)? {
        if date <= valuation_date {
            previous = date;
            continue;
        }
        let fixing_end = match index {
            FloatingIndex::Overnight(_) => date,
            FloatingIndex::Ibor(ibor) => ibor.tenor.add_to(previous)?,
        };
        let mut coupon = FloatingCoupon {
            payment_time: model_time(valuation_date, date),
            payment_accrual: day_count.year_fraction(previous, date),
            fixing_start: model_time(valuation_date, previous),
            fixing_end: model_time(valuation_date, fixing_end),
            fixing_accrual: day_count.year_fraction(previous, fixing_end),
            known_rate: None,
            accrued_growth: 1.0,
        };
        if previous < valuation_date {
            match index {
                FloatingIndex::Ibor(_) => {
                    coupon.known_rate = Some(fixing_on(index, fixings, previous)?);
                }
                FloatingIndex::Overnight(_) => {
                    coupon.accrued_growth =
                        accrued_overnight_growth(index, previous, valuation_date, fixings)?;
                    coupon.fixing_start = 0.0;
                }
            }
        }
        coupons.push(coupon);
        previous = date;
    }
    Ok(FloatingLeg {
        index: index.clone(),
        coupons,
        spread,
    })
}

fn convert_cash(def: &CashDefinition, valuation_date: NaiveDate) -> CalibrationResult<Cash> {
    ensure_not_started("deposit", def.start_date, valuation_date)?;
    ensure_ordered("deposit", def.start_date, def.end_date)?;
    Ok(Cash {
        currency: def.currency.clone(),
        start_time: model_time(valuation_date, def.start_date),
        end_time: model_time(valuation_date, def.end_date),
        accrual_factor: def.day_count.year_fraction(def.start_date, def.end_date),
        rate: def.rate,
        notional: def.notional,
    })
}

fn convert_fra(def: &FraDefinition, valuation_date: NaiveDate) -> CalibrationResult<Fra> {
    ensure_not_started("FRA", def.fixing_start_date, valuation_date)?;
    let end = def.index.tenor.add_to(def.fixing_start_date)?;
    ensure_ordered("FRA", def.fixing_start_date, end)?;
    let accrual = def.index.day_count.year_fraction(def.fixing_start_date, end);
    let start_time = model_time(valuation_date, def.fixing_start_date);
    Ok(Fra {
        index: def.index.clone(),
        payment_time: start_time,
        fixing_start: start_time,
        fixing_end: model_time(valuation_date, end),
        fixing_accrual: accrual,
        payment_accrual: accrual,
        rate: def.rate,
        notional: def.notional,
    })
}

fn convert_swap(
    def: &FixedFloatSwapDefinition,
    valuation_date: NaiveDate,
    fixings: &FixingMap,
) -> CalibrationResult<FixedFloatSwap> {
    ensure_ordered("swap", def.start_date, def.maturity_date)?;
    ensure_outstanding("swap", def.maturity_date, valuation_date)?;
    Ok(FixedFloatSwap {
        currency: def.currency.clone(),
        notional: def.notional,
        fixed: fixed_leg(
            def.start_date,
            def.maturity_date,
            def.fixed_period,
            def.fixed_day_count,
            def.rate,
            valuation_date,
        )?,
        floating: floating_leg(
            &def.floating_index,
            def.start_date,
            def.maturity_date,
            def.floating_period,
            0.0,
            valuation_date,
            fixings,
        )?,
    })
}

fn convert_basis_swap(
    def: &BasisSwapDefinition,
    valuation_date: NaiveDate,
    fixings: &FixingMap,
) -> CalibrationResult<BasisSwap> {
    ensure_ordered("basis swap", def.start_date, def.maturity_date)?;
    ensure_outstanding("basis swap", def.maturity_date, valuation_date)?;
    Ok(BasisSwap {
        currency: def.currency.clone(),
        notional: def.notional,
        spread_leg: floating_leg(
            &def.spread_index,
            def.start_date,
            def.maturity_date,
            def.spread_period,
            def.spread,
            valuation_date,
            fixings,
        )?,
        other_leg: floating_leg(
            &def.other_index,
            def.start_date,
            def.maturity_date,
            def.other_period,
            0.0,
            valuation_date,
            fixings,
        )?,
    })
}

fn convert_bill(def: &BillDefinition, valuation_date: NaiveDate) -> CalibrationResult<Bill> {
    ensure_not_started("bill", def.settlement_date, valuation_date)?;
    ensure_ordered("bill", def.settlement_date, def.maturity_date)?;
    Ok(Bill {
        currency: def.currency.clone(),
        settlement_time: model_time(valuation_date, def.settlement_date),
        maturity_time: model_time(valuation_date, def.maturity_date),
        price: def.price,
        notional: def.notional,
    })
}

fn convert_inflation_swap(
    def: &ZeroCouponInflationSwapDefinition,
    valuation_date: NaiveDate,
    fixings: &FixingMap,
) -> CalibrationResult<ZeroCouponInflationSwap> {
    ensure_ordered("inflation swap", def.start_date, def.maturity_date)?;
    ensure_ordered("inflation swap reference", def.reference_start_date, def.reference_end_date)?;

    let index_start_value = match def.index_start_value {
        Some(value) => value,
        None => fixings
            .get(&def.index.name)
            .and_then(|series| series.value_at(def.reference_start_date))
            .ok_or_else(|| {
                CalibrationError::conversion(format!(
                    "no fixing of {} on {}",
                    def.index.name, def.reference_start_date
                ))
            })?,
    };
    if !(index_start_value.is_finite() && index_start_value > 0.0) {
        return Err(CalibrationError::conversion(format!(
            "start index value must be positive, got {index_start_value}"
        )));
    }

    let months = months_between(def.start_date, def.maturity_date);
    if months <= 0 {
        return Err(CalibrationError::conversion(
            "inflation swap must span at least one month",
        ));
    }

    Ok(ZeroCouponInflationSwap {
        currency: def.currency.clone(),
        index: def.index.clone(),
        payment_time: model_time(valuation_date, def.maturity_date),
        reference_end_time: model_time(valuation_date, def.reference_end_date),
        index_start_value,
        years: f64::from(months) / 12.0,
        rate: def.rate,
        notional: def.notional,
    })
}

impl InstrumentConverter for DefinitionConverter {
    fn to_derivative(
        &self,
        definition: &InstrumentDefinition,
        valuation_date: NaiveDate,
        fixings: &FixingMap,
    ) -> CalibrationResult<InstrumentDerivative> {
        Ok(match definition {
            InstrumentDefinition::Cash(def) => {
                InstrumentDerivative::Cash(convert_cash(def, valuation_date)?)
            }
            InstrumentDefinition::Fra(def) => {
                InstrumentDerivative::Fra(convert_fra(def, valuation_date)?)
            }
            InstrumentDefinition::FixedFloatSwap(def) => {
                InstrumentDerivative::FixedFloatSwap(convert_swap(def, valuation_date, fixings)?)
            }
            InstrumentDefinition::BasisSwap(def) => {
                InstrumentDerivative::BasisSwap(convert_basis_swap(def, valuation_date, fixings)?)
            }
            InstrumentDefinition::Bill(def) => {
                InstrumentDerivative::Bill(convert_bill(def, valuation_date)?)
            }
            InstrumentDefinition::ZeroCouponInflationSwap(def) => {
                InstrumentDerivative::ZeroCouponInflationSwap(convert_inflation_swap(
                    def,
                    valuation_date,
                    fixings,
                )?)
            }
        })
    }
}
