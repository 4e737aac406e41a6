//! Calendar periods over which variables and parameters are evaluated.
//!
//! A `Period` is a value type: a unit (month or year), a start month and a
//! size expressed in that unit. Internally the start is stored as a month
//! index so that shifting is plain integer arithmetic and never fails.
//! Constructors only accept years chrono can represent and sizes up to
//! `MAX_PERIOD_MONTHS`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid period unit '{0}'")]
    InvalidUnit(String),
    #[error("Malformed period '{0}'")]
    Malformed(String),
    #[error("Month {0} is out of range 1..=12")]
    MonthOutOfRange(u32),
    #[error("Period size must be at least 1")]
    EmptyPeriod,
    #[error("Period '{period}' cannot be split into {unit} periods")]
    CannotSplit { period: String, unit: PeriodUnit },
    #[error("Period out of range: {0}")]
    OutOfRange(String),
}

/// Longest period accepted, in months.
pub const MAX_PERIOD_MONTHS: u32 = 12 * 10_000;

/// Granularity of a period, also used as the definition period of variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Month,
    Year,
}

impl PeriodUnit {
    #[inline]
    pub fn months(self) -> i32 {
        match self {
            PeriodUnit::Month => 1,
            PeriodUnit::Year => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodUnit::Month => "month",
            PeriodUnit::Year => "year",
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodUnit {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(PeriodUnit::Month),
            "year" => Ok(PeriodUnit::Year),
            other => Err(PeriodError::InvalidUnit(other.to_string())),
        }
    }
}

/// An immutable calendar interval.
///
/// Field order matters: the derived `Ord` sorts by start first, which gives
/// the total order by start date required when periods are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    /// Months since year 0: `year * 12 + (month - 1)`.
    start: i32,
    unit: PeriodUnit,
    size: u32,
}

impl Period {
    pub fn new(unit: PeriodUnit, start: NaiveDate, size: u32) -> Result<Self, PeriodError> {
        Self::month(start.year(), start.month())?.resized(unit, size)
    }

    pub fn month(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(PeriodError::OutOfRange(format!("year {}", year)));
        }
        Ok(Self { start: year * 12 + month as i32 - 1, unit: PeriodUnit::Month, size: 1 })
    }

    pub fn year(year: i32) -> Result<Self, PeriodError> {
        Self::month(year, 1)?.resized(PeriodUnit::Year, 1)
    }

    /// Same start, new unit and size.
    fn resized(self, unit: PeriodUnit, size: u32) -> Result<Self, PeriodError> {
        if size == 0 {
            return Err(PeriodError::EmptyPeriod);
        }
        match size.checked_mul(unit.months() as u32) {
            Some(months) if months <= MAX_PERIOD_MONTHS => Ok(Self { unit, size, ..self }),
            _ => Err(PeriodError::OutOfRange(format!("{} {}s", size, unit))),
        }
    }

    pub fn unit(&self) -> PeriodUnit { self.unit }
    pub fn size(&self) -> u32 { self.size }
    pub fn start_year(&self) -> i32 { self.start.div_euclid(12) }
    pub fn start_month(&self) -> u32 { self.start.rem_euclid(12) as u32 + 1 }

    fn size_in_months(&self) -> i32 {
        (self.size as i32).saturating_mul(self.unit.months())
    }

    /// Month index one past the last month of the period.
    fn end(&self) -> i32 {
        self.start.saturating_add(self.size_in_months())
    }

    /// First day of the period.
    pub fn to_date(&self) -> NaiveDate {
        month_start(self.start)
    }

    /// Last day of the period.
    pub fn stop_date(&self) -> NaiveDate {
        let next = month_start(self.end());
        next.pred_opt().unwrap_or(next)
    }

    /// Moves the start by `amount` units, keeping unit and size.
    pub fn shift(&self, unit: PeriodUnit, amount: i32) -> Self {
        Self {
            start: self.start.saturating_add(amount.saturating_mul(unit.months())),
            ..*self
        }
    }

    pub fn contains(&self, other: &Period) -> bool {
        self.start <= other.start && other.end() <= self.end()
    }

    pub fn first_month(&self) -> Self {
        Self { start: self.start, unit: PeriodUnit::Month, size: 1 }
    }

    pub fn last_month(&self) -> Self {
        self.first_month().shift(PeriodUnit::Month, -1)
    }

    /// The calendar year containing the start of the period.
    pub fn this_year(&self) -> Self {
        Self { start: self.start.saturating_sub(self.start.rem_euclid(12)), unit: PeriodUnit::Year, size: 1 }
    }

    pub fn last_year(&self) -> Self {
        self.this_year().shift(PeriodUnit::Year, -1)
    }

    /// The calendar year two years before the one containing the start,
    /// the reference year of fiscal resources.
    pub fn n_2(&self) -> Self {
        self.this_year().shift(PeriodUnit::Year, -2)
    }

    /// Splits the period into consecutive single-unit periods.
    pub fn sub_periods(&self, unit: PeriodUnit) -> Result<Vec<Period>, PeriodError> {
        let total = self.size_in_months();
        if total % unit.months() != 0 {
            return Err(PeriodError::CannotSplit { period: self.to_string(), unit });
        }
        let count = total / unit.months();
        Ok((0..count)
            .map(|i| Period { start: self.start.saturating_add(i * unit.months()), unit, size: 1 })
            .collect())
    }
}

fn month_start(index: i32) -> NaiveDate {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(if index < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, month) = (self.start_year(), self.start_month());
        match (self.unit, self.size) {
            (PeriodUnit::Month, 1) => write!(f, "{:04}-{:02}", year, month),
            (PeriodUnit::Year, 1) if month == 1 => write!(f, "{:04}", year),
            (unit, 1) => write!(f, "{}:{:04}-{:02}", unit, year, month),
            (unit, size) => write!(f, "{}:{:04}-{:02}:{}", unit, year, month, size),
        }
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    /// Accepts `2024`, `2024-03`, `year:2024`, `month:2024-03` and
    /// `month:2024-03:3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodError::Malformed(s.to_string());
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [instant] => {
                let (year, month) = parse_instant(instant).ok_or_else(malformed)?;
                match month {
                    Some(m) => Period::month(year, m),
                    None => Period::year(year),
                }
            }
            [unit, instant] | [unit, instant, _] => {
                let unit: PeriodUnit = unit.parse()?;
                let (year, month) = parse_instant(instant).ok_or_else(malformed)?;
                let size = match parts.get(2) {
                    Some(raw) => raw.parse::<u32>().map_err(|_| malformed())?,
                    None => 1,
                };
                Period::month(year, month.unwrap_or(1))?.resized(unit, size)
            }
            _ => Err(malformed()),
        }
    }
}

fn parse_instant(s: &str) -> Option<(i32, Option<u32>)> {
    let mut it = s.split('-');
    let year = it.next()?.parse::<i32>().ok()?;
    let month = match it.next() {
        Some(m) => Some(m.parse::<u32>().ok()?),
        None => None,
    };
    if it.next().is_some() {
        return None;
    }
    Some((year, month))
}
