use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::{PlannerConfig, RecordConfig},
    core::{
        catalogue::{Catalogue, derive_entry},
        log::OperationLog,
    },
    events::RecordEvent,
    operation::{LabelMismatch, Operation, check_label},
    planner::{self, PlanError, PlanOptions},
    types::{Km, ValidationError, check_haul, parse_date},
};

/// Rejected record mutation. The record is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// Only completed operations can be logged.
    #[error("operation `{label}` must be completed before logging")]
    NotDone {
        /// Offending operation.
        label: String,
    },
    /// Only operations with a distance interval enter the catalogue.
    #[error("operation `{label}` is not periodic")]
    NotPeriodic {
        /// Offending operation.
        label: String,
    },
    /// Label is not registered in the catalogue.
    #[error("no catalogue entry for `{label}`")]
    NotFound {
        /// Requested label.
        label: String,
    },
    /// No log entry equals the given operation.
    #[error("operation `{label}` at {km} km is not in the log")]
    NotInLog {
        /// Requested label.
        label: String,
        /// Requested completion distance.
        km: Km,
    },
    /// Two operations of different types were compared.
    #[error(transparent)]
    LabelMismatch(#[from] LabelMismatch),
    /// A value failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The forecast could not be computed.
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Serializable image of a whole [`VehicleRecord`]; catalogue sorted by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshotV1 {
    /// Vehicle name.
    pub label: String,
    /// Baseline date for never-logged operations.
    pub production_date: NaiveDate,
    /// Current odometer reading.
    pub haul: Km,
    /// Completed operations in distance order.
    pub log: Vec<Operation>,
    /// Periodic definitions with their latest completion.
    pub catalogue: Vec<Operation>,
}

/// One vehicle's service history and periodic definitions.
///
/// Every mutator keeps the log and the catalogue consistent: a catalogue
/// entry carries the completion of its newest log entry, or the production
/// baseline when the label was never logged. [`VehicleRecord::clear_log`]
/// leaves entries without a completion; the planner then projects from the
/// production baseline.
#[derive(Debug, Clone)]
pub struct VehicleRecord {
    label: String,
    production_date: NaiveDate,
    haul: Km,
    log: OperationLog,
    catalogue: Catalogue,
    modified: bool,
    pending_events: Vec<RecordEvent>,
}

impl VehicleRecord {
    /// Empty record with zero haul.
    pub fn new(label: impl Into<String>, production_date: NaiveDate) -> Self {
        Self {
            label: label.into(),
            production_date,
            haul: 0.0,
            log: OperationLog::new(),
            catalogue: Catalogue::new(),
            modified: false,
            pending_events: Vec::new(),
        }
    }

    /// Fresh log book named after `config.default_label`, produced `today`.
    pub fn with_defaults(config: &RecordConfig, today: NaiveDate) -> Self {
        Self::new(config.default_label.clone(), today)
    }

    /// Rebuilds a record, rejecting undone log entries and non-periodic
    /// catalogue entries. The result is not marked modified.
    pub fn from_snapshot(snapshot: VehicleSnapshotV1) -> Result<Self, RecordError> {
        let haul = check_haul(snapshot.haul)?;

        for op in &snapshot.log {
            op.definition().validate()?;
            let Some(km) = op.done_at_km() else {
                return Err(RecordError::NotDone {
                    label: op.label().to_string(),
                });
            };
            check_haul(km)?;
        }

        let mut catalogue = Catalogue::new();
        for op in snapshot.catalogue {
            op.definition().validate()?;
            if let Some(km) = op.done_at_km() {
                check_haul(km)?;
            }
            if !op.is_periodic() {
                return Err(RecordError::NotPeriodic {
                    label: op.label().to_string(),
                });
            }
            catalogue.upsert(op);
        }

        Ok(Self {
            label: snapshot.label,
            production_date: snapshot.production_date,
            haul,
            log: OperationLog::from_entries(snapshot.log),
            catalogue,
            modified: false,
            pending_events: Vec::new(),
        })
    }

    /// Captures the whole record for persistence.
    pub fn export_snapshot(&self) -> VehicleSnapshotV1 {
        VehicleSnapshotV1 {
            label: self.label.clone(),
            production_date: self.production_date,
            haul: self.haul,
            log: self.log.entries().to_vec(),
            catalogue: self.catalogue.sorted().into_iter().cloned().collect(),
        }
    }

    /// Vehicle name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Baseline date for never-logged operations.
    pub fn production_date(&self) -> NaiveDate {
        self.production_date
    }

    /// Current odometer reading.
    pub fn haul(&self) -> Km {
        self.haul
    }

    /// Service history.
    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    /// Periodic definitions.
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// True after any mutation since construction or the last save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clears the dirty flag once the record has been persisted.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Takes the change notifications queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<RecordEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Renames the vehicle.
    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if label != self.label {
            self.label = label;
            self.touch(RecordEvent::PropertiesChanged);
        }
    }

    /// Changes the production date and moves never-logged snapshots with it.
    pub fn set_production_date(&mut self, date: NaiveDate) {
        if date == self.production_date {
            return;
        }
        self.production_date = date;
        let stale: Vec<String> = self
            .catalogue
            .labels()
            .filter(|label| !self.log.contains_label(label))
            .map(str::to_string)
            .collect();
        for label in stale {
            self.refresh_entry(&label);
        }
        self.touch(RecordEvent::PropertiesChanged);
    }

    /// Accepts `YYYY-MM-DD` or `YYYY.MM.DD`.
    pub fn set_production_date_str(&mut self, text: &str) -> Result<(), ValidationError> {
        let date = parse_date(text)?;
        self.set_production_date(date);
        Ok(())
    }

    /// Sets the odometer reading; must be finite and non-negative.
    pub fn set_haul(&mut self, km: Km) -> Result<(), ValidationError> {
        let km = check_haul(km)?;
        if km != self.haul {
            self.haul = km;
            self.touch(RecordEvent::PropertiesChanged);
        }
        Ok(())
    }

    /// Files a completed operation into the log.
    ///
    /// A periodic operation also updates its catalogue entry when it is newer
    /// than the stored snapshot or the entry has none, and registers one
    /// when the label is unknown. A non-periodic operation under a catalogued
    /// label re-derives that entry, so the snapshot never depends on the
    /// order of edits.
    pub fn add_operation_to_log(&mut self, op: Operation) -> Result<(), RecordError> {
        let Some(km) = op.done_at_km() else {
            return Err(RecordError::NotDone {
                label: op.label().to_string(),
            });
        };
        let km = check_haul(km)?;
        op.definition().validate()?;
        let label = op.label().to_string();

        let (replaces, refreshes) = match self.catalogue.get(&label) {
            Some(stored) if op.is_periodic() => {
                (op.is_newer_than(stored)? || !stored.is_done(), false)
            }
            Some(_) => (false, true),
            None => (false, false),
        };
        let registers = op.is_periodic() && !self.catalogue.contains(&label);

        self.log.push(op.clone());
        debug!("event=log_add label={label} km={km}");
        self.touch(RecordEvent::LogAdded {
            label: label.clone(),
            km,
        });

        if replaces {
            self.catalogue.upsert(op);
            self.touch(RecordEvent::CatalogueUpdated { label });
        } else if refreshes {
            self.refresh_entry(&label);
        } else if registers {
            self.add_operation_to_cat(&op)?;
        }
        Ok(())
    }

    /// Registers a periodic definition; returns `false` when the label exists.
    ///
    /// The stored snapshot comes from the log, not from `op`.
    pub fn add_operation_to_cat(&mut self, op: &Operation) -> Result<bool, RecordError> {
        if !op.is_periodic() {
            return Err(RecordError::NotPeriodic {
                label: op.label().to_string(),
            });
        }
        if self.catalogue.contains(op.label()) {
            return Ok(false);
        }

        let entry = derive_entry(op, &self.log, self.production_date);
        let label = entry.label().to_string();
        self.catalogue.upsert(entry);
        debug!("event=cat_add label={label}");
        self.touch(RecordEvent::CatalogueAdded { label });
        Ok(true)
    }

    /// Removes each operation (matched by equality) from the log.
    ///
    /// Catalogue snapshots of the affected labels are re-derived from what
    /// remains. Nothing is removed unless every operation is found.
    pub fn remove_from_log(&mut self, ops: &[Operation]) -> Result<(), RecordError> {
        let mut indices = Vec::with_capacity(ops.len());
        for op in ops {
            let idx = self.log.position_excluding(op, &indices).ok_or_else(|| {
                RecordError::NotInLog {
                    label: op.label().to_string(),
                    km: op.done_at_km().unwrap_or(0.0),
                }
            })?;
            indices.push(idx);
        }

        let removed = self.log.remove_indices(indices);
        let mut affected = BTreeSet::new();
        for op in removed {
            let label = op.label().to_string();
            let km = op.done_at_km().unwrap_or(0.0);
            debug!("event=log_remove label={label} km={km}");
            affected.insert(label.clone());
            self.touch(RecordEvent::LogRemoved { label, km });
        }
        for label in affected {
            self.refresh_entry(&label);
        }
        Ok(())
    }

    /// Deletes catalogue definitions together with their whole history.
    ///
    /// Returns the number of purged log entries.
    pub fn remove_from_cat(&mut self, ops: &[Operation]) -> Result<usize, RecordError> {
        if let Some(missing) = ops.iter().find(|op| !self.catalogue.contains(op.label())) {
            return Err(RecordError::NotFound {
                label: missing.label().to_string(),
            });
        }

        let mut purged = 0;
        for op in ops {
            let label = op.label().to_string();
            if self.catalogue.remove(&label).is_none() {
                continue;
            }
            let removed = self.log.remove_label(&label);
            purged += removed.len();
            debug!("event=cat_remove label={label} purged={}", removed.len());
            self.touch(RecordEvent::CatalogueRemoved { label });
        }
        Ok(purged)
    }

    /// Renames an operation type across the log and the catalogue.
    pub fn op_label_replace(&mut self, old: &str, new: &str) -> Result<(), RecordError> {
        if old == new {
            return Ok(());
        }
        let new = check_label(new.to_string())?;

        let relabeled = self.log.relabel(old, &new);
        let moved = self.catalogue.remove(old);
        if relabeled == 0 && moved.is_none() {
            return Ok(());
        }

        if let Some(mut entry) = moved {
            entry.relabel(&new);
            if self.catalogue.contains(&new) {
                self.refresh_entry(&new);
            } else {
                self.add_operation_to_cat(&entry)?;
            }
        } else if self.catalogue.contains(&new) {
            self.refresh_entry(&new);
        }

        debug!("event=rename from={old} to={new} log_entries={relabeled}");
        self.touch(RecordEvent::Renamed {
            from: old.to_string(),
            to: new,
        });
        Ok(())
    }

    /// Replaces a logged operation with an edited version.
    pub fn update_operation(&mut self, old: &Operation, new: Operation) -> Result<(), RecordError> {
        if !new.is_done() {
            return Err(RecordError::NotDone {
                label: new.label().to_string(),
            });
        }
        if self.log.position_excluding(old, &[]).is_none() {
            return Err(RecordError::NotInLog {
                label: old.label().to_string(),
                km: old.done_at_km().unwrap_or(0.0),
            });
        }

        self.remove_from_log(std::slice::from_ref(old))?;
        self.add_operation_to_log(new)
    }

    /// Drops the history; catalogue definitions survive without completions.
    pub fn clear_log(&mut self) {
        self.log.clear();
        for entry in self.catalogue.values_mut() {
            entry.undo();
        }
        debug!("event=log_clear");
        self.touch(RecordEvent::LogCleared);
    }

    /// Drops the history and every definition.
    pub fn clear_all(&mut self) {
        self.log.clear();
        self.catalogue.clear();
        debug!("event=clear_all");
        self.touch(RecordEvent::AllCleared);
    }

    /// Sorted union of every label in the log or the catalogue.
    pub fn get_all_oper_labels(&self) -> Vec<String> {
        let labels: BTreeSet<&str> = self
            .log
            .iter()
            .map(Operation::label)
            .chain(self.catalogue.labels())
            .collect();
        labels.into_iter().map(str::to_string).collect()
    }

    /// Catalogue entry for `label`; `None` when not registered.
    pub fn get_periodic(&self, label: &str) -> Option<&Operation> {
        self.catalogue.get(label)
    }

    /// Forecast of the next due distance and date per catalogue entry.
    ///
    /// `current_haul`, when given, is stored as the record's haul first.
    pub fn make_maintenance_plan(
        &mut self,
        current_haul: Option<Km>,
        relative: bool,
    ) -> Result<Vec<Operation>, RecordError> {
        if let Some(km) = current_haul {
            self.set_haul(km)?;
        }
        let planned = planner::plan(
            self.catalogue.iter(),
            self.production_date,
            self.haul,
            PlanOptions { relative },
        )?;
        debug!("event=plan entries={} relative={relative}", planned.len());
        Ok(planned)
    }

    /// Forecast at the stored haul using configured options.
    pub fn plan_with(&self, config: &PlannerConfig) -> Result<Vec<Operation>, RecordError> {
        Ok(planner::plan(
            self.catalogue.iter(),
            self.production_date,
            self.haul,
            PlanOptions::from(config),
        )?)
    }

    fn refresh_entry(&mut self, label: &str) {
        let Some(current) = self.catalogue.get(label) else {
            return;
        };
        let entry = derive_entry(current, &self.log, self.production_date);
        if &entry != current {
            self.catalogue.upsert(entry);
            self.touch(RecordEvent::CatalogueUpdated {
                label: label.to_string(),
            });
        }
    }

    fn touch(&mut self, event: RecordEvent) {
        self.modified = true;
        self.pending_events.push(event);
    }
}
