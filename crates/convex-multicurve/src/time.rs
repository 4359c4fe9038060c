//! Dates, model time and schedules.
//!
//! Curves are expressed in model time: years from the valuation date on an
//! Actual/365 Fixed basis. Coupon accruals use the day count of their leg.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationResult};

/// Day count conventions used by calibration instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCount {
    /// Actual/360, money market convention.
    Act360,
    /// Actual/365 Fixed.
    Act365Fixed,
}

impl DayCount {
    /// Year basis of the convention.
    #[must_use]
    pub fn basis(self) -> f64 {
        match self {
            DayCount::Act360 => 360.0,
            DayCount::Act365Fixed => 365.0,
        }
    }

    /// Year fraction between two dates; negative when `end` precedes `start`.
    #[must_use]
    pub fn year_fraction(self, start: NaiveDate, end: NaiveDate) -> f64 {
        (end - start).num_days() as f64 / self.basis()
    }

    /// Convention name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DayCount::Act360 => "ACT/360",
            DayCount::Act365Fixed => "ACT/365F",
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Model time in years between the valuation date and `date`.
#[must_use]
pub fn model_time(valuation_date: NaiveDate, date: NaiveDate) -> f64 {
    DayCount::Act365Fixed.year_fraction(valuation_date, date)
}

/// A period expressed in calendar units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tenor {
    /// Calendar days.
    Days(u32),
    /// Calendar months.
    Months(u32),
    /// Calendar years.
    Years(u32),
}

impl Tenor {
    /// Adds the period to `date`, clamping to month end where needed.
    pub fn add_to(self, date: NaiveDate) -> CalibrationResult<NaiveDate> {
        let shifted = match self {
            Tenor::Days(n) => date.checked_add_days(Days::new(u64::from(n))),
            Tenor::Months(n) => date.checked_add_months(Months::new(n)),
            Tenor::Years(n) => n
                .checked_mul(12)
                .and_then(|months| date.checked_add_months(Months::new(months))),
        };
        shifted.ok_or_else(|| {
            CalibrationError::conversion(format!("date overflow adding {self} to {date}"))
        })
    }

    /// Adds the period `n` times to `date`, measured from `date` to avoid
    /// month-end drift.
    pub fn add_times(self, date: NaiveDate, n: u32) -> CalibrationResult<NaiveDate> {
        let scaled = match self {
            Tenor::Days(d) => d.checked_mul(n).map(Tenor::Days),
            Tenor::Months(m) => m.checked_mul(n).map(Tenor::Months),
            Tenor::Years(y) => y.checked_mul(n).map(Tenor::Years),
        };
        scaled
            .ok_or_else(|| CalibrationError::conversion(format!("tenor overflow: {n} x {self}")))?
            .add_to(date)
    }

    /// Returns true for a zero-length period.
    #[must_use]
    pub fn is_zero(self) -> bool {
        matches!(self, Tenor::Days(0) | Tenor::Months(0) | Tenor::Years(0))
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenor::Days(n) => write!(f, "{n}D"),
            Tenor::Months(n) => write!(f, "{n}M"),
            Tenor::Years(n) => write!(f, "{n}Y"),
        }
    }
}

/// Regular schedule from `start` to `end` stepping by `period`.
///
/// Returns the period end dates; the first period starts at `start` and the
/// last one is cut short at `end` when the period does not divide evenly.
pub fn periodic_schedule(
    start: NaiveDate,
    end: NaiveDate,
    period: Tenor,
) -> CalibrationResult<Vec<NaiveDate>> {
    if end <= start {
        return Err(CalibrationError::conversion(format!(
            "schedule end {end} must be after start {start}"
        )));
    }
    if period.is_zero() {
        return Err(CalibrationError::conversion("schedule period must be positive"));
    }

    let mut dates = Vec::new();
    let mut k = 1;
    loop {
        let date = period.add_times(start, k)?;
        if date >= end {
            dates.push(end);
            return Ok(dates);
        }
        dates.push(date);
        k += 1;
    }
}

/// Whole calendar months from `start` to `end`, ignoring the day of month.
#[must_use]
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    use chrono::Datelike;
    (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32
}

/// Historical fixings of an index, keyed by fixing date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixingSeries {
    values: BTreeMap<NaiveDate, f64>,
}

impl FixingSeries {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixing, replacing any previous value on the same date.
    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        self.values.insert(date, value);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_fixing(mut self, date: NaiveDate, value: f64) -> Self {
        self.insert(date, value);
        self
    }

    /// Fixing on exactly `date`.
    #[must_use]
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// Latest fixing on or before `date`.
    #[must_use]
    pub fn latest_on_or_before(&self, date: NaiveDate) -> Option<(NaiveDate, f64)> {
        self.values
            .range(..=date)
            .next_back()
            .map(|(d, v)| (*d, *v))
    }

    /// Earliest fixing strictly after `date`.
    #[must_use]
    pub fn first_after(&self, date: NaiveDate) -> Option<(NaiveDate, f64)> {
        use std::ops::Bound;
        self.values
            .range((Bound::Excluded(date), Bound::Unbounded))
            .next()
            .map(|(d, v)| (*d, *v))
    }

    /// Number of fixings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no fixings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_fractions() {
        let start = date(2024, 1, 1);
        let end = date(2024, 7, 1);
        assert_relative_eq!(DayCount::Act360.year_fraction(start, end), 182.0 / 360.0);
        assert_relative_eq!(DayCount::Act365Fixed.year_fraction(start, end), 182.0 / 365.0);
        assert!(DayCount::Act360.year_fraction(end, start) < 0.0);
        assert_relative_eq!(model_time(start, start), 0.0);
    }

    #[test]
    fn test_tenor_arithmetic() {
        let d = date(2024, 1, 31);
        assert_eq!(Tenor::Days(1).add_to(d).unwrap(), date(2024, 2, 1));
        assert_eq!(Tenor::Months(1).add_to(d).unwrap(), date(2024, 2, 29));
        assert_eq!(Tenor::Years(2).add_to(d).unwrap(), date(2026, 1, 31));
        assert_eq!(Tenor::Months(3).add_times(d, 2).unwrap(), date(2024, 7, 31));
        assert_eq!(format!("{}", Tenor::Months(6)), "6M");
    }

    #[test]
    fn test_periodic_schedule() {
        let start = date(2024, 1, 15);
        let schedule = periodic_schedule(start, date(2025, 1, 15), Tenor::Months(3)).unwrap();
        assert_eq!(
            schedule,
            vec![
                date(2024, 4, 15),
                date(2024, 7, 15),
                date(2024, 10, 15),
                date(2025, 1, 15)
            ]
        );

        let stub = periodic_schedule(start, date(2024, 9, 1), Tenor::Months(6)).unwrap();
        assert_eq!(stub, vec![date(2024, 7, 15), date(2024, 9, 1)]);
    }

    #[test]
    fn test_schedule_rejects_bad_input() {
        let start = date(2024, 1, 15);
        assert!(periodic_schedule(start, start, Tenor::Months(3)).is_err());
        assert!(periodic_schedule(start, date(2025, 1, 1), Tenor::Months(0)).is_err());
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2024, 1, 15), date(2029, 1, 15)), 60);
        assert_eq!(months_between(date(2024, 11, 1), date(2025, 2, 28)), 3);
    }

    #[test]
    fn test_fixing_series() {
        let series = FixingSeries::new()
            .with_fixing(date(2024, 1, 1), 300.0)
            .with_fixing(date(2024, 2, 1), 301.0);
        assert_eq!(series.value_at(date(2024, 2, 1)), Some(301.0));
        assert_eq!(series.value_at(date(2024, 2, 2)), None);
        assert_eq!(
            series.latest_on_or_before(date(2024, 1, 20)),
            Some((date(2024, 1, 1), 300.0))
        );
        assert_eq!(series.latest_on_or_before(date(2023, 12, 31)), None);
        assert_eq!(
            series.first_after(date(2024, 1, 1)),
            Some((date(2024, 2, 1), 301.0))
        );
        assert_eq!(series.first_after(date(2024, 2, 1)), None);
        assert_eq!(series.len(), 2);
    }
}
