use chrono::NaiveDate;
use hashbrown::HashMap;

use crate::{
    core::log::OperationLog,
    operation::{Completion, Operation},
};

/// Periodic definitions keyed by label, each with its last-completion snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    entries: HashMap<String, Operation>,
}

impl Catalogue {
    /// Empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `label`, if registered.
    pub fn get(&self, label: &str) -> Option<&Operation> {
        self.entries.get(label)
    }

    /// True when `label` is registered.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no definition is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.entries.values()
    }

    /// Entries ordered by label.
    pub fn sorted(&self) -> Vec<&Operation> {
        let mut out: Vec<&Operation> = self.entries.values().collect();
        out.sort_by(|a, b| a.label().cmp(b.label()));
        out
    }

    /// Registered labels in arbitrary order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn upsert(&mut self, entry: Operation) -> Option<Operation> {
        self.entries.insert(entry.label().to_string(), entry)
    }

    pub(crate) fn remove(&mut self, label: &str) -> Option<Operation> {
        self.entries.remove(label)
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        self.entries.values_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Builds the catalogue value for `definition` from the current history.
///
/// The snapshot is the log entry of the same label with the greatest
/// distance, or `(0 km, production_date)` when the label was never done.
pub fn derive_entry(
    definition: &Operation,
    log: &OperationLog,
    production_date: NaiveDate,
) -> Operation {
    let completion = log
        .latest_for(definition.label())
        .and_then(Operation::completion)
        .cloned()
        .unwrap_or_else(|| baseline(production_date));
    definition.stamped(completion)
}

pub(crate) fn baseline(production_date: NaiveDate) -> Completion {
    Completion {
        at_km: 0.0,
        on: production_date,
        comment: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn derive_uses_production_baseline_without_history() {
        let def = Operation::new("Coolant", 60_000.0, Span::from_years(4.0).unwrap()).unwrap();
        let entry = derive_entry(&def, &OperationLog::new(), date(2006, 11, 30));
        assert_eq!(entry.done_at_km(), Some(0.0));
        assert_eq!(entry.done_on(), Some(date(2006, 11, 30)));
        assert!(!def.is_done());
    }

    #[test]
    fn derive_picks_greatest_distance_of_same_label() {
        let def = Operation::new("Coolant", 60_000.0, Span::ZERO).unwrap();
        let other = Operation::new("Filter", 15_000.0, Span::ZERO).unwrap();
        let mut log = OperationLog::new();
        log.push(def.complete(61_000.0, date(2010, 5, 1), "").unwrap());
        log.push(def.complete(120_500.0, date(2014, 6, 2), "G12").unwrap());
        log.push(other.complete(200_000.0, date(2016, 1, 1), "").unwrap());

        let entry = derive_entry(&def, &log, date(2006, 11, 30));
        assert_eq!(entry.done_at_km(), Some(120_500.0));
        assert_eq!(entry.done_on(), Some(date(2014, 6, 2)));
        assert_eq!(entry.done_comment(), Some("G12"));
    }
}
