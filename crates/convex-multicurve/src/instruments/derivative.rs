//! Calibration instruments in model time.
//!
//! Dates have been turned into times (years from valuation, Act/365F) and
//! accrual factors; these are what pricing calculators consume.

use crate::error::CalibrationResult;
use crate::index::{Currency, FloatingIndex, IndexIbor, IndexPrice};
use crate::provider::CurveBindings;

/// Rate guess for a basis swap, whose quote is a spread and not a rate.
pub const BASIS_SWAP_RATE_GUESS: f64 = 0.01;

/// Guess for instruments without a natural one.
pub const DEFAULT_INITIAL_GUESS: f64 = 100.0;

/// Deposit: pay the notional at start, receive it with interest at end.
#[derive(Debug, Clone, PartialEq)]
pub struct Cash {
    /// Currency.
    pub currency: Currency,
    /// Start time.
    pub start_time: f64,
    /// End time.
    pub end_time: f64,
    /// Accrual factor of the deposit period.
    pub accrual_factor: f64,
    /// Deposit rate.
    pub rate: f64,
    /// Notional.
    pub notional: f64,
}

/// Forward rate agreement settled at the start of the fixing period.
#[derive(Debug, Clone, PartialEq)]
pub struct Fra {
    /// Index fixed.
    pub index: IndexIbor,
    /// Payment time (fixing period start).
    pub payment_time: f64,
    /// Fixing period start.
    pub fixing_start: f64,
    /// Fixing period end.
    pub fixing_end: f64,
    /// Accrual of the fixing period on the index convention.
    pub fixing_accrual: f64,
    /// Accrual used for the payment.
    pub payment_accrual: f64,
    /// Contract rate.
    pub rate: f64,
    /// Notional.
    pub notional: f64,
}

/// Fixed coupon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCoupon {
    /// Payment time.
    pub payment_time: f64,
    /// Accrual factor.
    pub accrual_factor: f64,
}

/// Floating coupon paying the forward over its fixing period plus a spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingCoupon {
    /// Payment time.
    pub payment_time: f64,
    /// Accrual used for the payment.
    pub payment_accrual: f64,
    /// Fixing period start.
    pub fixing_start: f64,
    /// Fixing period end.
    pub fixing_end: f64,
    /// Accrual of the fixing period on the index convention.
    pub fixing_accrual: f64,
    /// Rate fixed before the valuation date; the coupon then reads no
    /// forward curve.
    pub known_rate: Option<f64>,
    /// Compounded growth of the overnight fixings between the period start
    /// and the valuation date, which is then `fixing_start`. One otherwise.
    pub accrued_growth: f64,
}

/// Fixed leg.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLeg {
    /// Coupons in payment order.
    pub coupons: Vec<FixedCoupon>,
    /// Fixed rate.
    pub rate: f64,
}

/// Floating leg.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingLeg {
    /// Index paid.
    pub index: FloatingIndex,
    /// Coupons in payment order.
    pub coupons: Vec<FloatingCoupon>,
    /// Spread over the index.
    pub spread: f64,
}

/// Receive fixed, pay floating.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedFloatSwap {
    /// Currency.
    pub currency: Currency,
    /// Notional.
    pub notional: f64,
    /// Received leg; its rate is the quote.
    pub fixed: FixedLeg,
    /// Paid leg.
    pub floating: FloatingLeg,
}

/// Receive a floating leg plus spread, pay another floating leg.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisSwap {
    /// Currency.
    pub currency: Currency,
    /// Notional.
    pub notional: f64,
    /// Received leg; its spread is the quote.
    pub spread_leg: FloatingLeg,
    /// Paid leg.
    pub other_leg: FloatingLeg,
}

/// Discount bill bought at `price` on settlement, repaid at maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    /// Currency.
    pub currency: Currency,
    /// Settlement time.
    pub settlement_time: f64,
    /// Maturity time.
    pub maturity_time: f64,
    /// Price per unit notional.
    pub price: f64,
    /// Notional.
    pub notional: f64,
}

/// Zero-coupon inflation swap: receive `(1 + rate)^n - 1`, pay
/// `I(reference end) / I(reference start) - 1`, both at payment time.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCouponInflationSwap {
    /// Currency.
    pub currency: Currency,
    /// Price index.
    pub index: IndexPrice,
    /// Payment time.
    pub payment_time: f64,
    /// Time of the final index reference.
    pub reference_end_time: f64,
    /// Known index value at the start reference.
    pub index_start_value: f64,
    /// Compounding periods in years.
    pub years: f64,
    /// Fixed rate.
    pub rate: f64,
    /// Notional.
    pub notional: f64,
}

/// Kind of a calibration instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// Deposit.
    Cash,
    /// Forward rate agreement.
    Fra,
    /// Fixed against floating swap.
    FixedFloatSwap,
    /// Floating against floating swap.
    BasisSwap,
    /// Discount bill.
    Bill,
    /// Zero-coupon inflation swap.
    ZeroCouponInflationSwap,
}

/// A calibration instrument in model time.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentDerivative {
    /// Deposit.
    Cash(Cash),
    /// Forward rate agreement.
    Fra(Fra),
    /// Fixed against floating swap.
    FixedFloatSwap(FixedFloatSwap),
    /// Floating against floating swap.
    BasisSwap(BasisSwap),
    /// Discount bill.
    Bill(Bill),
    /// Zero-coupon inflation swap.
    ZeroCouponInflationSwap(ZeroCouponInflationSwap),
}

impl InstrumentDerivative {
    /// Instrument kind.
    #[must_use]
    pub fn kind(&self) -> InstrumentKind {
        match self {
            Self::Cash(_) => InstrumentKind::Cash,
            Self::Fra(_) => InstrumentKind::Fra,
            Self::FixedFloatSwap(_) => InstrumentKind::FixedFloatSwap,
            Self::BasisSwap(_) => InstrumentKind::BasisSwap,
            Self::Bill(_) => InstrumentKind::Bill,
            Self::ZeroCouponInflationSwap(_) => InstrumentKind::ZeroCouponInflationSwap,
        }
    }

    /// Payment currency.
    #[must_use]
    pub fn currency(&self) -> &Currency {
        match self {
            Self::Cash(c) => &c.currency,
            Self::Fra(f) => &f.index.currency,
            Self::FixedFloatSwap(s) => &s.currency,
            Self::BasisSwap(s) => &s.currency,
            Self::Bill(b) => &b.currency,
            Self::ZeroCouponInflationSwap(s) => &s.currency,
        }
    }

    /// The quoted rate, spread or price.
    #[must_use]
    pub fn market_quote(&self) -> f64 {
        match self {
            Self::Cash(c) => c.rate,
            Self::Fra(f) => f.rate,
            Self::FixedFloatSwap(s) => s.fixed.rate,
            Self::BasisSwap(s) => s.spread_leg.spread,
            Self::Bill(b) => b.price,
            Self::ZeroCouponInflationSwap(s) => s.rate,
        }
    }

    /// Time of the last cash flow or fixing period end.
    #[must_use]
    pub fn last_payment_time(&self) -> f64 {
        fn last_fixed(leg: &FixedLeg) -> f64 {
            leg.coupons.iter().map(|c| c.payment_time).fold(0.0, f64::max)
        }
        fn last_floating(leg: &FloatingLeg) -> f64 {
            leg.coupons
                .iter()
                .map(|c| c.payment_time.max(c.fixing_end))
                .fold(0.0, f64::max)
        }
        match self {
            Self::Cash(c) => c.end_time,
            Self::Fra(f) => f.fixing_end.max(f.payment_time),
            Self::FixedFloatSwap(s) => last_fixed(&s.fixed).max(last_floating(&s.floating)),
            Self::BasisSwap(s) => last_floating(&s.spread_leg).max(last_floating(&s.other_leg)),
            Self::Bill(b) => b.maturity_time,
            Self::ZeroCouponInflationSwap(s) => s.payment_time,
        }
    }

    /// Time of the last index reference; for instruments without an index
    /// reference this is the last payment time.
    #[must_use]
    pub fn last_fixing_start_time(&self) -> f64 {
        match self {
            Self::ZeroCouponInflationSwap(s) => s.reference_end_time,
            other => other.last_payment_time(),
        }
    }

    /// Names of the curves this instrument reads, resolved through `bindings`.
    pub fn required_curves(&self, bindings: &CurveBindings) -> CalibrationResult<Vec<String>> {
        let mut names = vec![bindings.discounting_curve(self.currency())?.to_string()];
        match self {
            Self::Cash(_) | Self::Bill(_) => {}
            Self::Fra(f) => {
                names.push(
                    bindings
                        .forward_curve(&FloatingIndex::Ibor(f.index.clone()))?
                        .to_string(),
                );
            }
            Self::FixedFloatSwap(s) => {
                names.push(bindings.forward_curve(&s.floating.index)?.to_string());
            }
            Self::BasisSwap(s) => {
                names.push(bindings.forward_curve(&s.spread_leg.index)?.to_string());
                names.push(bindings.forward_curve(&s.other_leg.index)?.to_string());
            }
            Self::ZeroCouponInflationSwap(s) => {
                names.push(bindings.price_index_curve(&s.index)?.to_string());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Starting value for the node this instrument calibrates.
    ///
    /// Rates for rate instruments, the start index level for inflation
    /// swaps, and the continuously compounded yield for bills.
    #[must_use]
    pub fn initial_guess_quote(&self) -> f64 {
        match self {
            Self::Cash(c) => c.rate,
            Self::Fra(f) => f.rate,
            Self::FixedFloatSwap(s) => s.fixed.rate,
            Self::BasisSwap(_) => BASIS_SWAP_RATE_GUESS,
            Self::Bill(b) => {
                let tenor = b.maturity_time - b.settlement_time;
                if b.price > 0.0 && tenor > 0.0 {
                    -b.price.ln() / tenor
                } else {
                    DEFAULT_INITIAL_GUESS
                }
            }
            Self::ZeroCouponInflationSwap(s) => s.index_start_value,
        }
    }
}
