//! Dated instrument definitions and quote templates.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};
use crate::index::{Currency, FloatingIndex, IndexIbor, IndexPrice};
use crate::time::{DayCount, Tenor};

/// Deposit between two dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashDefinition {
    /// Currency.
    pub currency: Currency,
    /// Start date.
    pub start_date: NaiveDate,
    /// End date.
    pub end_date: NaiveDate,
    /// Accrual convention.
    pub day_count: DayCount,
    /// Deposit rate.
    pub rate: f64,
    /// Notional.
    pub notional: f64,
}

/// FRA on one fixing of a term index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraDefinition {
    /// Index fixed.
    pub index: IndexIbor,
    /// Start of the fixing period; the period length is the index tenor.
    pub fixing_start_date: NaiveDate,
    /// Contract rate.
    pub rate: f64,
    /// Notional.
    pub notional: f64,
}

/// Fixed against floating swap (OIS or Ibor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedFloatSwapDefinition {
    /// Currency.
    pub currency: Currency,
    /// Effective date.
    pub start_date: NaiveDate,
    /// Maturity date.
    pub maturity_date: NaiveDate,
    /// Fixed leg period.
    pub fixed_period: Tenor,
    /// Fixed leg accrual convention.
    pub fixed_day_count: DayCount,
    /// Floating leg index.
    pub floating_index: FloatingIndex,
    /// Floating leg period.
    pub floating_period: Tenor,
    /// Fixed rate.
    pub rate: f64,
    /// Notional.
    pub notional: f64,
}

/// Floating against floating swap with a spread on the first leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisSwapDefinition {
    /// Currency.
    pub currency: Currency,
    /// Effective date.
    pub start_date: NaiveDate,
    /// Maturity date.
    pub maturity_date: NaiveDate,
    /// Index of the leg paying the spread.
    pub spread_index: FloatingIndex,
    /// Period of the spread leg.
    pub spread_period: Tenor,
    /// Index of the other leg.
    pub other_index: FloatingIndex,
    /// Period of the other leg.
    pub other_period: Tenor,
    /// Quoted spread.
    pub spread: f64,
    /// Notional.
    pub notional: f64,
}

/// Discount bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDefinition {
    /// Currency.
    pub currency: Currency,
    /// Settlement date.
    pub settlement_date: NaiveDate,
    /// Maturity date.
    pub maturity_date: NaiveDate,
    /// Price per unit notional.
    pub price: f64,
    /// Notional.
    pub notional: f64,
}

/// Zero-coupon inflation swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroCouponInflationSwapDefinition {
    /// Currency.
    pub currency: Currency,
    /// Price index.
    pub index: IndexPrice,
    /// Effective date.
    pub start_date: NaiveDate,
    /// Maturity (payment) date.
    pub maturity_date: NaiveDate,
    /// Index reference date at start.
    pub reference_start_date: NaiveDate,
    /// Index reference date at maturity.
    pub reference_end_date: NaiveDate,
    /// Start index value; looked up in fixings when absent.
    pub index_start_value: Option<f64>,
    /// Fixed rate.
    pub rate: f64,
    /// Notional.
    pub notional: f64,
}

/// A dated calibration instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstrumentDefinition {
    /// Deposit.
    Cash(CashDefinition),
    /// Forward rate agreement.
    Fra(FraDefinition),
    /// Fixed against floating swap.
    FixedFloatSwap(FixedFloatSwapDefinition),
    /// Floating against floating swap.
    BasisSwap(BasisSwapDefinition),
    /// Discount bill.
    Bill(BillDefinition),
    /// Zero-coupon inflation swap.
    ZeroCouponInflationSwap(ZeroCouponInflationSwapDefinition),
}

impl InstrumentDefinition {
    /// Payment currency.
    #[must_use]
    pub fn currency(&self) -> &Currency {
        match self {
            Self::Cash(d) => &d.currency,
            Self::Fra(d) => &d.index.currency,
            Self::FixedFloatSwap(d) => &d.currency,
            Self::BasisSwap(d) => &d.currency,
            Self::Bill(d) => &d.currency,
            Self::ZeroCouponInflationSwap(d) => &d.currency,
        }
    }

    /// The quoted rate, spread or price.
    #[must_use]
    pub fn market_quote(&self) -> f64 {
        match self {
            Self::Cash(d) => d.rate,
            Self::Fra(d) => d.rate,
            Self::FixedFloatSwap(d) => d.rate,
            Self::BasisSwap(d) => d.spread,
            Self::Bill(d) => d.price,
            Self::ZeroCouponInflationSwap(d) => d.rate,
        }
    }

    /// Same instrument with the quote replaced.
    #[must_use]
    pub fn with_market_quote(&self, quote: f64) -> Self {
        let mut bumped = self.clone();
        match &mut bumped {
            Self::Cash(d) => d.rate = quote,
            Self::Fra(d) => d.rate = quote,
            Self::FixedFloatSwap(d) => d.rate = quote,
            Self::BasisSwap(d) => d.spread = quote,
            Self::Bill(d) => d.price = quote,
            Self::ZeroCouponInflationSwap(d) => d.rate = quote,
        }
        bumped
    }
}

/// Conventions that turn a `(tenor, quote)` pair into a definition.
///
/// Instruments start on the valuation date; no business day adjustment is
/// applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstrumentTemplate {
    /// Deposit ending after the tenor.
    Deposit {
        /// Currency.
        currency: Currency,
        /// Accrual convention.
        day_count: DayCount,
    },
    /// FRA starting after the tenor on the index period.
    Fra {
        /// Index fixed.
        index: IndexIbor,
    },
    /// Fixed against floating swap maturing after the tenor.
    FixedFloatSwap {
        /// Fixed leg period.
        fixed_period: Tenor,
        /// Fixed leg accrual convention.
        fixed_day_count: DayCount,
        /// Floating leg index.
        floating_index: FloatingIndex,
        /// Floating leg period.
        floating_period: Tenor,
    },
    /// Basis swap maturing after the tenor.
    BasisSwap {
        /// Index of the spread leg.
        spread_index: FloatingIndex,
        /// Period of the spread leg.
        spread_period: Tenor,
        /// Index of the other leg.
        other_index: FloatingIndex,
        /// Period of the other leg.
        other_period: Tenor,
    },
    /// Bill maturing after the tenor, quoted by price.
    Bill {
        /// Currency.
        currency: Currency,
    },
    /// Zero-coupon inflation swap with a monthly observation lag.
    ZeroCouponInflationSwap {
        /// Price index.
        index: IndexPrice,
        /// Observation lag in months.
        lag_months: u32,
    },
}

impl InstrumentTemplate {
    /// Generates the definition for one quote.
    pub fn generate(
        &self,
        valuation_date: NaiveDate,
        tenor: Tenor,
        quote: f64,
        notional: f64,
    ) -> CalibrationResult<InstrumentDefinition> {
        let end = tenor.add_to(valuation_date)?;
        Ok(match self {
            Self::Deposit {
                currency,
                day_count,
            } => InstrumentDefinition::Cash(CashDefinition {
                currency: currency.clone(),
                start_date: valuation_date,
                end_date: end,
                day_count: *day_count,
                rate: quote,
                notional,
            }),
            Self::Fra { index } => InstrumentDefinition::Fra(FraDefinition {
                index: index.clone(),
                fixing_start_date: end,
                rate: quote,
                notional,
            }),
            Self::FixedFloatSwap {
                fixed_period,
                fixed_day_count,
                floating_index,
                floating_period,
            } => InstrumentDefinition::FixedFloatSwap(FixedFloatSwapDefinition {
                currency: floating_index.currency().clone(),
                start_date: valuation_date,
                maturity_date: end,
                fixed_period: *fixed_period,
                fixed_day_count: *fixed_day_count,
                floating_index: floating_index.clone(),
                floating_period: *floating_period,
                rate: quote,
                notional,
            }),
            Self::BasisSwap {
                spread_index,
                spread_period,
                other_index,
                other_period,
            } => InstrumentDefinition::BasisSwap(BasisSwapDefinition {
                currency: spread_index.currency().clone(),
                start_date: valuation_date,
                maturity_date: end,
                spread_index: spread_index.clone(),
                spread_period: *spread_period,
                other_index: other_index.clone(),
                other_period: *other_period,
                spread: quote,
                notional,
            }),
            Self::Bill { currency } => InstrumentDefinition::Bill(BillDefinition {
                currency: currency.clone(),
                settlement_date: valuation_date,
                maturity_date: end,
                price: quote,
                notional,
            }),
            Self::ZeroCouponInflationSwap { index, lag_months } => {
                let lag = Months::new(*lag_months);
                let reference = |date: NaiveDate| {
                    date.checked_sub_months(lag).ok_or_else(|| {
                        CalibrationError::conversion(format!("date overflow lagging {date}"))
                    })
                };
                InstrumentDefinition::ZeroCouponInflationSwap(ZeroCouponInflationSwapDefinition {
                    currency: index.currency.clone(),
                    index: index.clone(),
                    start_date: valuation_date,
                    maturity_date: end,
                    reference_start_date: reference(valuation_date)?,
                    reference_end_date: reference(end)?,
                    index_start_value: None,
                    rate: quote,
                    notional,
                })
            }
        })
    }

    /// Generates one definition per `(tenor, quote)` pair.
    pub fn generate_strip(
        &self,
        valuation_date: NaiveDate,
        quotes: &[(Tenor, f64)],
        notional: f64,
    ) -> CalibrationResult<Vec<InstrumentDefinition>> {
        quotes
            .iter()
            .map(|(tenor, quote)| self.generate(valuation_date, *tenor, *quote, notional))
            .collect()
    }
}
