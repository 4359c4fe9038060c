//! Discounting pricers for calibration instruments.
//!
//! Each pricer returns a value together with its [`CurveSensitivity`].
//! Yield curve points are sensitivities to the zero rate `r(t)`, using
//! `d P(t) / d r(t) = -t P(t)`; price index points are sensitivities to the
//! index level.

use crate::curves::YieldCurve;
use crate::error::{CalibrationError, CalibrationResult};
use crate::index::FloatingIndex;
use crate::instruments::{
    BasisSwap, Bill, Cash, FixedFloatSwap, FixedLeg, FloatingLeg, Fra, InstrumentDerivative,
    ZeroCouponInflationSwap,
};
use crate::provider::MulticurveProvider;
use crate::sensitivity::CurveSensitivity;

/// A value and its curve sensitivity.
pub(crate) type Measured = (f64, CurveSensitivity);

/// `sum_i N a_i P(t_i)` over a fixed leg.
fn fixed_annuity(leg: &FixedLeg, notional: f64, dsc: &YieldCurve) -> CalibrationResult<Measured> {
    let mut annuity = 0.0;
    let mut sensitivity = CurveSensitivity::new();
    for c in &leg.coupons {
        let pv = notional * c.accrual_factor * dsc.discount_factor(c.payment_time)?;
        annuity += pv;
        sensitivity.add(dsc.name(), c.payment_time, -c.payment_time * pv);
    }
    Ok((annuity, sensitivity))
}

/// `sum_i N a_i P(t_i)` over a floating leg's payment accruals.
fn floating_annuity(
    leg: &FloatingLeg,
    notional: f64,
    dsc: &YieldCurve,
) -> CalibrationResult<Measured> {
    let mut annuity = 0.0;
    let mut sensitivity = CurveSensitivity::new();
    for c in &leg.coupons {
        let pv = notional * c.payment_accrual * dsc.discount_factor(c.payment_time)?;
        annuity += pv;
        sensitivity.add(dsc.name(), c.payment_time, -c.payment_time * pv);
    }
    Ok((annuity, sensitivity))
}

/// Present value of a floating leg paying forward plus spread.
fn floating_leg(
    leg: &FloatingLeg,
    notional: f64,
    dsc: &YieldCurve,
    fwd: &YieldCurve,
) -> CalibrationResult<Measured> {
    let mut pv = 0.0;
    let mut sensitivity = CurveSensitivity::new();
    for c in &leg.coupons {
        let p_pay = dsc.discount_factor(c.payment_time)?;
        if let Some(rate) = c.known_rate {
            let coupon_pv = notional * c.payment_accrual * (rate + leg.spread) * p_pay;
            pv += coupon_pv;
            sensitivity.add(dsc.name(), c.payment_time, -c.payment_time * coupon_pv);
            continue;
        }
        let ratio = c.accrued_growth * fwd.discount_factor(c.fixing_start)?
            / fwd.discount_factor(c.fixing_end)?;
        let forward = (ratio - 1.0) / c.fixing_accrual;
        let coupon_pv = notional * c.payment_accrual * (forward + leg.spread) * p_pay;
        pv += coupon_pv;

        sensitivity.add(dsc.name(), c.payment_time, -c.payment_time * coupon_pv);
        let k = notional * c.payment_accrual * p_pay * ratio / c.fixing_accrual;
        sensitivity.add(fwd.name(), c.fixing_start, -c.fixing_start * k);
        sensitivity.add(fwd.name(), c.fixing_end, c.fixing_end * k);
    }
    Ok((pv, sensitivity))
}

/// Par spread `-PV / PVBP` of the quoted leg, with quotient-rule sensitivity.
fn par_spread_from(pv: Measured, pvbp: Measured) -> CalibrationResult<Measured> {
    let (value, d_value) = pv;
    let (basis, d_basis) = pvbp;
    if basis == 0.0 {
        return Err(CalibrationError::instrument_evaluation(
            "quoted leg has zero PVBP",
        ));
    }
    let spread = -value / basis;
    let sensitivity = d_value
        .multiplied_by(-1.0 / basis)
        .plus(d_basis.multiplied_by(value / (basis * basis)));
    Ok((spread, sensitivity))
}

fn forward<'a>(
    curves: &'a MulticurveProvider,
    index: &FloatingIndex,
) -> CalibrationResult<&'a YieldCurve> {
    Ok(curves.forward_curve(index)?.as_ref())
}

// ---------------------------------------------------------------------------
// Cash
// ---------------------------------------------------------------------------

fn cash_pv(cash: &Cash, curves: &MulticurveProvider) -> CalibrationResult<Measured> {
    let dsc = curves.discount_curve(&cash.currency)?;
    let p_start = dsc.discount_factor(cash.start_time)?;
    let p_end = dsc.discount_factor(cash.end_time)?;
    let repay = cash.notional * (1.0 + cash.rate * cash.accrual_factor);
    let pv = -cash.notional * p_start + repay * p_end;

    let mut sensitivity = CurveSensitivity::new();
    sensitivity.add(dsc.name(), cash.start_time, cash.start_time * cash.notional * p_start);
    sensitivity.add(dsc.name(), cash.end_time, -cash.end_time * repay * p_end);
    Ok((pv, sensitivity))
}

fn cash_par_spread(cash: &Cash, curves: &MulticurveProvider) -> CalibrationResult<Measured> {
    let dsc = curves.discount_curve(&cash.currency)?;
    let ratio = dsc.discount_factor(cash.start_time)? / dsc.discount_factor(cash.end_time)?;
    let a = cash.accrual_factor;

    let mut sensitivity = CurveSensitivity::new();
    sensitivity.add(dsc.name(), cash.start_time, -cash.start_time * ratio / a);
    sensitivity.add(dsc.name(), cash.end_time, cash.end_time * ratio / a);
    Ok(((ratio - 1.0) / a - cash.rate, sensitivity))
}

// ---------------------------------------------------------------------------
// FRA
// ---------------------------------------------------------------------------

fn fra_forward(fra: &Fra, fwd: &YieldCurve) -> CalibrationResult<(f64, f64)> {
    let ratio = fwd.discount_factor(fra.fixing_start)? / fwd.discount_factor(fra.fixing_end)?;
    Ok(((ratio - 1.0) / fra.fixing_accrual, ratio))
}

fn fra_forward_sensitivity(fra: &Fra, fwd: &YieldCurve, ratio: f64, scale: f64) -> CurveSensitivity {
    let k = scale * ratio / fra.fixing_accrual;
    CurveSensitivity::of(fwd.name(), fra.fixing_start, -fra.fixing_start * k)
        .plus(CurveSensitivity::of(fwd.name(), fra.fixing_end, fra.fixing_end * k))
}

fn fra_pv(fra: &Fra, curves: &MulticurveProvider) -> CalibrationResult<Measured> {
    let dsc = curves.discount_curve(&fra.index.currency)?;
    let fwd = forward(curves, &FloatingIndex::Ibor(fra.index.clone()))?;
    let (rate, ratio) = fra_forward(fra, fwd)?;
    let p_pay = dsc.discount_factor(fra.payment_time)?;
    let a = fra.payment_accrual;
    let denominator = 1.0 + a * rate;
    let pv = fra.notional * a * (rate - fra.rate) / denominator * p_pay;

    let d_pv_d_rate = fra.notional * a * p_pay * (1.0 + a * fra.rate) / (denominator * denominator);
    let sensitivity = fra_forward_sensitivity(fra, fwd, ratio, d_pv_d_rate).plus(
        CurveSensitivity::of(dsc.name(), fra.payment_time, -fra.payment_time * pv),
    );
    Ok((pv, sensitivity))
}

fn fra_par_spread(fra: &Fra, curves: &MulticurveProvider) -> CalibrationResult<Measured> {
    let fwd = forward(curves, &FloatingIndex::Ibor(fra.index.clone()))?;
    let (rate, ratio) = fra_forward(fra, fwd)?;
    Ok((rate - fra.rate, fra_forward_sensitivity(fra, fwd, ratio, 1.0)))
}

// ---------------------------------------------------------------------------
// Swaps
// ---------------------------------------------------------------------------

fn fixed_float_pv_and_annuity(
    swap: &FixedFloatSwap,
    curves: &MulticurveProvider,
) -> CalibrationResult<(Measured, Measured)> {
    let dsc = curves.discount_curve(&swap.currency)?;
    let fwd = forward(curves, &swap.floating.index)?;
    let (annuity, d_annuity) = fixed_annuity(&swap.fixed, swap.notional, dsc)?;
    let (float_pv, d_float) = floating_leg(&swap.floating, swap.notional, dsc, fwd)?;

    let pv = swap.fixed.rate * annuity - float_pv;
    let d_pv = d_annuity
        .clone()
        .multiplied_by(swap.fixed.rate)
        .plus(d_float.multiplied_by(-1.0));
    Ok(((pv, d_pv), (annuity, d_annuity)))
}

fn basis_pv_and_annuity(
    swap: &BasisSwap,
    curves: &MulticurveProvider,
) -> CalibrationResult<(Measured, Measured)> {
    let dsc = curves.discount_curve(&swap.currency)?;
    let fwd_spread = forward(curves, &swap.spread_leg.index)?;
    let fwd_other = forward(curves, &swap.other_leg.index)?;
    let (receive, d_receive) = floating_leg(&swap.spread_leg, swap.notional, dsc, fwd_spread)?;
    let (pay, d_pay) = floating_leg(&swap.other_leg, swap.notional, dsc, fwd_other)?;
    let annuity = floating_annuity(&swap.spread_leg, swap.notional, dsc)?;
    Ok((
        (receive - pay, d_receive.plus(d_pay.multiplied_by(-1.0))),
        annuity,
    ))
}

// ---------------------------------------------------------------------------
// Bill
// ---------------------------------------------------------------------------

fn bill_pv(bill: &Bill, curves: &MulticurveProvider) -> CalibrationResult<Measured> {
    let dsc = curves.discount_curve(&bill.currency)?;
    let p_settle = dsc.discount_factor(bill.settlement_time)?;
    let p_maturity = dsc.discount_factor(bill.maturity_time)?;
    let pv = bill.notional * (p_maturity - bill.price * p_settle);

    let mut sensitivity = CurveSensitivity::new();
    sensitivity.add(
        dsc.name(),
        bill.maturity_time,
        -bill.maturity_time * bill.notional * p_maturity,
    );
    sensitivity.add(
        dsc.name(),
        bill.settlement_time,
        bill.settlement_time * bill.notional * bill.price * p_settle,
    );
    Ok((pv, sensitivity))
}

fn bill_par_spread(bill: &Bill, curves: &MulticurveProvider) -> CalibrationResult<Measured> {
    let dsc = curves.discount_curve(&bill.currency)?;
    let ratio = dsc.discount_factor(bill.maturity_time)? / dsc.discount_factor(bill.settlement_time)?;

    let mut sensitivity = CurveSensitivity::new();
    sensitivity.add(dsc.name(), bill.maturity_time, -bill.maturity_time * ratio);
    sensitivity.add(dsc.name(), bill.settlement_time, bill.settlement_time * ratio);
    Ok((ratio - bill.price, sensitivity))
}

// ---------------------------------------------------------------------------
// Zero-coupon inflation swap
// ---------------------------------------------------------------------------

fn inflation_ratio(
    swap: &ZeroCouponInflationSwap,
    curves: &MulticurveProvider,
) -> CalibrationResult<(f64, String)> {
    let index_curve = curves.price_index_curve_for(&swap.index)?;
    let level = index_curve.price_index(swap.reference_end_time)?;
    Ok((level / swap.index_start_value, index_curve.name().to_string()))
}

fn inflation_pv(
    swap: &ZeroCouponInflationSwap,
    curves: &MulticurveProvider,
) -> CalibrationResult<Measured> {
    let dsc = curves.discount_curve(&swap.currency)?;
    let (ratio, index_name) = inflation_ratio(swap, curves)?;
    let p_pay = dsc.discount_factor(swap.payment_time)?;
    let fixed = (1.0 + swap.rate).powf(swap.years);
    let pv = swap.notional * p_pay * (fixed - ratio);

    let mut sensitivity = CurveSensitivity::new();
    sensitivity.add(dsc.name(), swap.payment_time, -swap.payment_time * pv);
    sensitivity.add(
        index_name,
        swap.reference_end_time,
        -swap.notional * p_pay / swap.index_start_value,
    );
    Ok((pv, sensitivity))
}

fn inflation_par_spread(
    swap: &ZeroCouponInflationSwap,
    curves: &MulticurveProvider,
) -> CalibrationResult<Measured> {
    let (ratio, index_name) = inflation_ratio(swap, curves)?;
    if ratio <= 0.0 {
        return Err(CalibrationError::instrument_evaluation(format!(
            "non-positive index ratio {ratio} on {index_name}"
        )));
    }
    let exponent = 1.0 / swap.years;
    let implied = ratio.powf(exponent) - 1.0;
    let d_ratio = exponent * ratio.powf(exponent - 1.0) / swap.index_start_value;
    Ok((
        implied - swap.rate,
        CurveSensitivity::of(index_name, swap.reference_end_time, d_ratio),
    ))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Present value in the instrument currency.
pub(crate) fn present_value(
    instrument: &InstrumentDerivative,
    curves: &MulticurveProvider,
) -> CalibrationResult<Measured> {
    match instrument {
        InstrumentDerivative::Cash(cash) => cash_pv(cash, curves),
        InstrumentDerivative::Fra(fra) => fra_pv(fra, curves),
        InstrumentDerivative::FixedFloatSwap(swap) => Ok(fixed_float_pv_and_annuity(swap, curves)?.0),
        InstrumentDerivative::BasisSwap(swap) => Ok(basis_pv_and_annuity(swap, curves)?.0),
        InstrumentDerivative::Bill(bill) => bill_pv(bill, curves),
        InstrumentDerivative::ZeroCouponInflationSwap(swap) => inflation_pv(swap, curves),
    }
}

/// Market quote implied by the curves minus the instrument's quote.
pub(crate) fn par_spread(
    instrument: &InstrumentDerivative,
    curves: &MulticurveProvider,
) -> CalibrationResult<Measured> {
    match instrument {
        InstrumentDerivative::Cash(cash) => cash_par_spread(cash, curves),
        InstrumentDerivative::Fra(fra) => fra_par_spread(fra, curves),
        InstrumentDerivative::FixedFloatSwap(swap) => {
            let (pv, annuity) = fixed_float_pv_and_annuity(swap, curves)?;
            par_spread_from(pv, annuity)
        }
        InstrumentDerivative::BasisSwap(swap) => {
            let (pv, annuity) = basis_pv_and_annuity(swap, curves)?;
            par_spread_from(pv, annuity)
        }
        InstrumentDerivative::Bill(bill) => bill_par_spread(bill, curves),
        InstrumentDerivative::ZeroCouponInflationSwap(swap) => inflation_par_spread(swap, curves),
    }
}

/// Derivative of the present value with respect to the instrument's quote.
pub(crate) fn present_value_quote_sensitivity(
    instrument: &InstrumentDerivative,
    curves: &MulticurveProvider,
) -> CalibrationResult<f64> {
    match instrument {
        InstrumentDerivative::Cash(cash) => {
            let dsc = curves.discount_curve(&cash.currency)?;
            Ok(cash.notional * cash.accrual_factor * dsc.discount_factor(cash.end_time)?)
        }
        InstrumentDerivative::Fra(fra) => {
            let dsc = curves.discount_curve(&fra.index.currency)?;
            let fwd = forward(curves, &FloatingIndex::Ibor(fra.index.clone()))?;
            let (rate, _) = fra_forward(fra, fwd)?;
            let p_pay = dsc.discount_factor(fra.payment_time)?;
            Ok(-fra.notional * fra.payment_accrual * p_pay / (1.0 + fra.payment_accrual * rate))
        }
        InstrumentDerivative::FixedFloatSwap(swap) => {
            let (_, (annuity, _)) = fixed_float_pv_and_annuity(swap, curves)?;
            Ok(annuity)
        }
        InstrumentDerivative::BasisSwap(swap) => {
            let (_, (annuity, _)) = basis_pv_and_annuity(swap, curves)?;
            Ok(annuity)
        }
        InstrumentDerivative::Bill(bill) => {
            let dsc = curves.discount_curve(&bill.currency)?;
            Ok(-bill.notional * dsc.discount_factor(bill.settlement_time)?)
        }
        InstrumentDerivative::ZeroCouponInflationSwap(swap) => {
            let dsc = curves.discount_curve(&swap.currency)?;
            Ok(swap.notional
                * dsc.discount_factor(swap.payment_time)?
                * swap.years
                * (1.0 + swap.rate).powf(swap.years - 1.0))
        }
    }
}
