//! Tunables for new records, forecasts and the snapshot store.

use serde::{Deserialize, Serialize};

/// Defaults applied when a new log book is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Vehicle label of a fresh record.
    pub default_label: String,
    /// Extension appended to suggested snapshot file names.
    pub file_extension: String,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            default_label: "Unknown Vehicle".to_string(),
            file_extension: ".servint".to_string(),
        }
    }
}

impl RecordConfig {
    /// Suggested snapshot file name for a vehicle label.
    ///
    /// Characters other than alphanumerics, `-`, `_` and spaces become `_`.
    pub fn file_name_for(&self, vehicle_label: &str) -> String {
        let stem: String = vehicle_label
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let stem = if stem.is_empty() {
            self.default_label.as_str()
        } else {
            stem.as_str()
        };
        format!("{stem}{}", self.file_extension)
    }
}

/// Forecast defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Report kilometres remaining rather than absolute odometer readings.
    pub relative: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { relative: true }
    }
}

/// Snapshot store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordStoreConfig {
    /// Snapshot rows kept after each save; 0 keeps every row.
    pub keep_snapshots: usize,
    /// Enable SQLite WAL journaling.
    pub wal: bool,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            keep_snapshots: 10,
            wal: true,
        }
    }
}

/// All crate settings, loadable from a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServintConfig {
    /// New-record defaults.
    pub record: RecordConfig,
    /// Forecast defaults.
    pub planner: PlannerConfig,
    /// Snapshot store settings.
    pub store: RecordStoreConfig,
}

impl ServintConfig {
    /// Parses a JSON document; missing keys keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ServintConfig::from_json_str(r#"{"planner":{"relative":false}}"#).unwrap();
        assert!(!cfg.planner.relative);
        assert_eq!(cfg.record, RecordConfig::default());
        assert_eq!(cfg.store.keep_snapshots, 10);
    }

    #[test]
    fn file_name_replaces_path_separators() {
        let cfg = RecordConfig::default();
        assert_eq!(cfg.file_name_for("VW Golf/IV"), "VW Golf_IV.servint");
        assert_eq!(cfg.file_name_for("  "), "Unknown Vehicle.servint");
    }
}
