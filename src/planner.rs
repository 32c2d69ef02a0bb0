//! Maintenance forecast derived from catalogue snapshots.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{config::PlannerConfig, operation::Operation, types::Km};

/// Forecast failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Planned date falls outside the supported calendar.
    #[error("planned date for `{label}` is out of range")]
    DateOutOfRange {
        /// Catalogue label of the offending entry.
        label: String,
    },
    /// Planned distance overflowed to a non-finite value.
    #[error("planned distance for `{label}` is not finite")]
    Distance {
        /// Catalogue label of the offending entry.
        label: String,
    },
}

/// How planned distances are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Report kilometres remaining until due instead of odometer readings.
    pub relative: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { relative: true }
    }
}

impl From<&PlannerConfig> for PlanOptions {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            relative: config.relative,
        }
    }
}

/// Projects the next due distance and date for every catalogue entry.
///
/// Each result is a completed copy of the entry stamped with its planned
/// distance and date, sorted by that distance (ties by label). Entries with
/// no completion snapshot are projected from `(0 km, production_date)`.
/// With `options.relative` the distance is `planned - haul`, which is
/// negative for overdue work.
pub fn plan<'a>(
    entries: impl IntoIterator<Item = &'a Operation>,
    production_date: NaiveDate,
    haul: Km,
    options: PlanOptions,
) -> Result<Vec<Operation>, PlanError> {
    let mut planned = Vec::new();
    for entry in entries {
        let (last_km, last_on) = entry
            .completion()
            .map(|c| (c.at_km, c.on))
            .unwrap_or((0.0, production_date));

        let on = entry
            .interval_time()
            .add_to(last_on)
            .ok_or_else(|| PlanError::DateOutOfRange {
                label: entry.label().to_string(),
            })?;
        let mut km = last_km + entry.interval_km();
        if options.relative {
            km -= haul;
        }

        let stamped = entry
            .forecast(km, on, entry.comment())
            .map_err(|_| PlanError::Distance {
                label: entry.label().to_string(),
            })?;
        planned.push(stamped);
    }

    planned.sort_by(|a, b| {
        a.cmp_by_distance(b)
            .then_with(|| a.label().cmp(b.label()))
    });
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn undone_entry_projects_from_production() {
        let belt = Operation::new("Timing belt", 90_000.0, Span::from_years(5.0).unwrap()).unwrap();
        let out = plan([&belt], date(2010, 1, 1), 0.0, PlanOptions { relative: false }).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].done_at_km(), Some(90_000.0));
        assert_eq!(out[0].done_on(), Some(date(2014, 12, 31)));
    }

    #[test]
    fn equal_distances_sort_by_label() {
        let base = date(2010, 1, 1);
        let b = Operation::new("B", 10.0, Span::ZERO).unwrap();
        let a = Operation::new("A", 10.0, Span::ZERO).unwrap();
        let out = plan([&b, &a], base, 0.0, PlanOptions::default()).unwrap();
        let labels: Vec<&str> = out.iter().map(Operation::label).collect();
        assert_eq!(labels, ["A", "B"]);
    }
}
