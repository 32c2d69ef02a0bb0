//! Service operation definitions and their completed instances.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Km, Span, ValidationError, check_haul, check_interval, parse_number};

/// Two operations of different types were compared as if they were one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot compare `{left}` with `{right}`: labels differ")]
pub struct LabelMismatch {
    /// Label of the receiver.
    pub left: String,
    /// Label of the argument.
    pub right: String,
}

/// Operation type: what is done and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    label: String,
    interval_km: Km,
    interval_time: Span,
    #[serde(default)]
    comment: String,
}

impl Definition {
    /// Validates and builds a definition with an empty comment.
    pub fn new(
        label: impl Into<String>,
        interval_km: Km,
        interval_time: Span,
    ) -> Result<Self, ValidationError> {
        let label = check_label(label.into())?;
        let interval_km = check_interval(interval_km)?;
        Ok(Self {
            label,
            interval_km,
            interval_time,
            comment: String::new(),
        })
    }

    /// Operation type name; unique within a catalogue.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Distance between two services, 0 when only time matters.
    pub fn interval_km(&self) -> Km {
        self.interval_km
    }

    /// Time between two services.
    pub fn interval_time(&self) -> Span {
        self.interval_time
    }

    /// Free text about the operation type.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Distance interval alone decides periodicity; a time-only interval does not count.
    pub fn is_periodic(&self) -> bool {
        self.interval_km > 0.0
    }

    /// Re-checks fields that may have bypassed constructors (deserialized data).
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_label(self.label.clone())?;
        check_interval(self.interval_km)?;
        check_interval(self.interval_time.days())?;
        Ok(())
    }
}

/// Completion stamp of an operation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Odometer reading when the work was done.
    pub at_km: Km,
    /// Calendar date the work was done.
    pub on: NaiveDate,
    /// Free text about this particular instance.
    #[serde(default)]
    pub comment: String,
}

/// A service operation, either a bare definition or a completed instance.
///
/// The completion is an `Option`, so a non-done operation can never carry
/// completion fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    definition: Definition,
    #[serde(default)]
    completion: Option<Completion>,
}

impl Operation {
    /// Builds a non-done operation.
    pub fn new(
        label: impl Into<String>,
        interval_km: Km,
        interval_time: Span,
    ) -> Result<Self, ValidationError> {
        Ok(Self::from_definition(Definition::new(
            label,
            interval_km,
            interval_time,
        )?))
    }

    /// Wraps a definition as a non-done operation.
    pub fn from_definition(definition: Definition) -> Self {
        Self {
            definition,
            completion: None,
        }
    }

    /// Sets the definition comment (price, parts, ...).
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.definition.comment = comment.into();
        self
    }

    /// The operation type.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// See [`Definition::label`].
    pub fn label(&self) -> &str {
        self.definition.label()
    }

    /// See [`Definition::interval_km`].
    pub fn interval_km(&self) -> Km {
        self.definition.interval_km()
    }

    /// See [`Definition::interval_time`].
    pub fn interval_time(&self) -> Span {
        self.definition.interval_time()
    }

    /// Definition comment, not the completion comment.
    pub fn comment(&self) -> &str {
        self.definition.comment()
    }

    /// See [`Definition::is_periodic`].
    pub fn is_periodic(&self) -> bool {
        self.definition.is_periodic()
    }

    /// True when a completion is attached.
    pub fn is_done(&self) -> bool {
        self.completion.is_some()
    }

    /// Completion stamp, if any.
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Odometer reading of the completion.
    pub fn done_at_km(&self) -> Option<Km> {
        self.completion.as_ref().map(|c| c.at_km)
    }

    /// Date of the completion.
    pub fn done_on(&self) -> Option<NaiveDate> {
        self.completion.as_ref().map(|c| c.on)
    }

    /// Comment of the completion.
    pub fn done_comment(&self) -> Option<&str> {
        self.completion.as_ref().map(|c| c.comment.as_str())
    }

    /// Returns a completed copy stamped with `km`, `on` and `comment`.
    ///
    /// The receiver is left untouched, so one definition can stamp out any
    /// number of completed instances. `km` is an odometer reading: finite
    /// and non-negative.
    pub fn complete(
        &self,
        km: Km,
        on: NaiveDate,
        comment: impl Into<String>,
    ) -> Result<Operation, ValidationError> {
        let km = check_haul(km)?;
        Ok(self.stamped(Completion {
            at_km: km,
            on,
            comment: comment.into(),
        }))
    }

    /// Forecast stamp; relative distances are negative for overdue work.
    pub(crate) fn forecast(
        &self,
        km: Km,
        on: NaiveDate,
        comment: impl Into<String>,
    ) -> Result<Operation, ValidationError> {
        if !km.is_finite() {
            return Err(ValidationError::Distance(km));
        }
        Ok(self.stamped(Completion {
            at_km: km,
            on,
            comment: comment.into(),
        }))
    }

    /// Same as [`Operation::complete`] but takes the distance as text.
    pub fn complete_parsed(
        &self,
        km: &str,
        on: NaiveDate,
        comment: impl Into<String>,
    ) -> Result<Operation, ValidationError> {
        self.complete(Self::parse_km(km)?, on, comment)
    }

    /// Clears the completion in place.
    pub fn undo(&mut self) {
        self.completion = None;
    }

    /// Parses a distance typed as text.
    pub fn parse_km(text: &str) -> Result<Km, ValidationError> {
        parse_number(text).map_err(|_| ValidationError::Number(text.trim().to_string()))
    }

    /// Orders by completion distance only; a non-done operation counts as 0 km.
    ///
    /// Labels are ignored. Use [`Operation::is_newer_than`] when the two
    /// values must be of the same type.
    pub fn cmp_by_distance(&self, other: &Operation) -> Ordering {
        self.sort_km().total_cmp(&other.sort_km())
    }

    /// True when `self` was completed further down the road than `other`.
    pub fn is_newer_than(&self, other: &Operation) -> Result<bool, LabelMismatch> {
        if self.label() != other.label() {
            return Err(LabelMismatch {
                left: self.label().to_string(),
                right: other.label().to_string(),
            });
        }
        Ok(self.cmp_by_distance(other) == Ordering::Greater)
    }

    pub(crate) fn stamped(&self, completion: Completion) -> Operation {
        Operation {
            definition: self.definition.clone(),
            completion: Some(completion),
        }
    }

    pub(crate) fn relabel(&mut self, label: &str) {
        self.definition.label = label.to_string();
    }

    fn sort_km(&self) -> Km {
        self.done_at_km().unwrap_or(0.0)
    }
}

pub(crate) fn check_label(label: String) -> Result<String, ValidationError> {
    if label.trim().is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oil() -> Operation {
        Operation::new("Oil change", 10_000.0, Span::from_years(1.0).unwrap()).unwrap()
    }

    #[test]
    fn non_finite_distance_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2015, 12, 5).unwrap();
        assert_eq!(
            oil().complete(f64::INFINITY, date, "").unwrap_err(),
            ValidationError::Distance(f64::INFINITY)
        );
        assert!(oil().complete_parsed("98k", date, "").is_err());
        assert_eq!(
            oil().complete_parsed(" 98042 ", date, "").unwrap().done_at_km(),
            Some(98_042.0)
        );
    }

    #[test]
    fn undone_operation_sorts_as_zero() {
        let date = NaiveDate::from_ymd_opt(2015, 12, 5).unwrap();
        let done = oil().complete(1.0, date, "").unwrap();
        assert_eq!(oil().cmp_by_distance(&done), Ordering::Less);
    }

    #[test]
    fn negative_odometer_only_stamps_forecasts() {
        let date = NaiveDate::from_ymd_opt(2015, 12, 5).unwrap();
        assert_eq!(
            oil().complete(-5_000.0, date, "").unwrap_err(),
            ValidationError::Distance(-5_000.0)
        );
        let overdue = oil().forecast(-5_000.0, date, "").unwrap();
        assert_eq!(overdue.done_at_km(), Some(-5_000.0));
    }
}
