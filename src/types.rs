//! Shared primitive types: distances, time spans, and calendar dates.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Odometer distance in kilometres.
pub type Km = f64;

/// Days counted per year when a span is expressed in years.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Rejected value at the point of assignment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Operation label was empty or whitespace only.
    #[error("operation label must be non-empty text")]
    EmptyLabel,
    /// Interval was negative or not finite.
    #[error("interval must be a finite non-negative number, got {0}")]
    Interval(f64),
    /// Distance or haul was not usable.
    #[error("distance must be a finite non-negative number, got {0}")]
    Distance(f64),
    /// Text did not name a real calendar date.
    #[error("date must be YYYY-MM-DD or YYYY.MM.DD, got `{0}`")]
    Date(String),
    /// Text did not parse as a number.
    #[error("`{0}` is not a number")]
    Number(String),
}

/// Non-negative time interval, stored in days.
///
/// Years convert with [`DAYS_PER_YEAR`], months as a twelfth of that.
/// Adding a span to a date rounds to whole days.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Span {
    days: f64,
}

impl Span {
    /// The empty span; an operation with it is not time-periodic.
    pub const ZERO: Self = Self { days: 0.0 };

    /// Builds a span from a day count.
    pub fn from_days(days: f64) -> Result<Self, ValidationError> {
        if !days.is_finite() || days < 0.0 {
            return Err(ValidationError::Interval(days));
        }
        Ok(Self { days })
    }

    /// Builds a span from a (possibly fractional) year count.
    pub fn from_years(years: f64) -> Result<Self, ValidationError> {
        check_interval(years)?;
        Self::from_days(years * DAYS_PER_YEAR)
    }

    /// Builds a span from a (possibly fractional) month count.
    pub fn from_months(months: f64) -> Result<Self, ValidationError> {
        check_interval(months)?;
        Self::from_days(months * DAYS_PER_YEAR / 12.0)
    }

    /// Parses a numeric year count such as `"1"` or `"0.5"`.
    pub fn parse_years(text: &str) -> Result<Self, ValidationError> {
        Self::from_years(parse_number(text)?)
    }

    /// Parses a numeric month count.
    pub fn parse_months(text: &str) -> Result<Self, ValidationError> {
        Self::from_months(parse_number(text)?)
    }

    /// Length in days.
    pub fn days(self) -> f64 {
        self.days
    }

    /// Length in years.
    pub fn years(self) -> f64 {
        self.days / DAYS_PER_YEAR
    }

    /// Length in months.
    pub fn months(self) -> f64 {
        self.days * 12.0 / DAYS_PER_YEAR
    }

    /// True when the span is a whole number of years (zero included).
    pub fn is_whole_years(self) -> bool {
        let years = self.years();
        (years - years.round()).abs() < 1e-9
    }

    /// Adds the span to `date`; `None` when the result leaves chrono's range.
    pub fn add_to(self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_add_days(Days::new(self.days.round() as u64))
    }
}

/// Parses numeric text, the only coercion the model accepts.
pub fn parse_number(text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::Number(trimmed.to_string())),
    }
}

/// Parses `YYYY-MM-DD` or `YYYY.MM.DD` into a calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    let normalized = text.trim().replace('.', "-");
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .map_err(|_| ValidationError::Date(text.trim().to_string()))
}

/// Checks a distance used as an odometer value: finite and non-negative.
pub fn check_haul(km: Km) -> Result<Km, ValidationError> {
    if !km.is_finite() || km < 0.0 {
        return Err(ValidationError::Distance(km));
    }
    Ok(km)
}

pub(crate) fn check_interval(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::Interval(value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_dates_parse_like_dashed() {
        let a = parse_date("1984.01.23").unwrap();
        let b = parse_date("1984-01-23").unwrap();
        assert_eq!(a, b);
        assert!(parse_date("1984-02-30").is_err());
    }

    #[test]
    fn one_year_adds_365_days() {
        let span = Span::from_years(1.0).unwrap();
        let start = NaiveDate::from_ymd_opt(2015, 12, 5).unwrap();
        assert_eq!(span.add_to(start), NaiveDate::from_ymd_opt(2016, 12, 4));
        assert!(span.is_whole_years());
        assert!(!Span::from_months(6.0).unwrap().is_whole_years());
    }

    #[test]
    fn negative_spans_are_rejected() {
        assert_eq!(Span::from_years(-1.0), Err(ValidationError::Interval(-1.0)));
        assert!(Span::from_days(f64::NAN).is_err());
        assert!(matches!(Span::parse_months("six"), Err(ValidationError::Number(_))));
    }
}
