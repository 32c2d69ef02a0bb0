/// SQLite snapshot store.
pub mod sqlite;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::record::{RecordError, VehicleRecord, VehicleSnapshotV1};

/// Version tag written into every snapshot payload.
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Persistence failure.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Database access failed.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Snapshot could not be serialized.
    #[error("snapshot encoding: {0}")]
    Serde(#[from] serde_json::Error),
    /// Payload does not decode to a vehicle snapshot.
    #[error("payload is not a vehicle record: {0}")]
    TypeMismatch(String),
    /// Nothing has been saved yet.
    #[error("store holds no snapshot")]
    Empty,
    /// Snapshot decoded but breaks record rules.
    #[error("snapshot content rejected: {0}")]
    Record(#[from] RecordError),
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Versioned wrapper around a [`VehicleSnapshotV1`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// Writer's [`SNAPSHOT_FORMAT_VERSION`].
    pub format_version: u16,
    /// Record content.
    pub snapshot: VehicleSnapshotV1,
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    format_version: u16,
    snapshot: serde_json::Value,
}

/// Payload written by another format version; the load still succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatibilityWarning {
    /// Version tag read from the payload.
    pub found: u16,
    /// Version this build writes.
    pub expected: u16,
}

impl std::fmt::Display for CompatibilityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "snapshot format version {} differs from current version {}",
            self.found, self.expected
        )
    }
}

/// Result of a successful load.
#[derive(Debug)]
pub struct LoadedRecord {
    /// Restored record, not marked modified.
    pub record: VehicleRecord,
    /// Set when the payload came from another format version.
    pub warning: Option<CompatibilityWarning>,
}

/// Whole-record persistence backend.
pub trait RecordStore {
    /// Persists the whole record as one unit and clears its dirty flag.
    fn save(&mut self, record: &mut VehicleRecord) -> PersistResult<()>;
    /// Loads the most recently saved record.
    fn load(&self) -> PersistResult<LoadedRecord>;
}

/// Serializes `record` into a versioned JSON envelope.
pub fn encode_snapshot_payload(record: &VehicleRecord) -> PersistResult<Vec<u8>> {
    let env = SnapshotEnvelope {
        format_version: SNAPSHOT_FORMAT_VERSION,
        snapshot: record.export_snapshot(),
    };
    Ok(serde_json::to_vec(&env)?)
}

/// Decodes a payload written by [`encode_snapshot_payload`].
///
/// A different version tag is tolerated and reported as a warning; anything
/// that is not a vehicle snapshot is a [`PersistError::TypeMismatch`].
pub fn decode_snapshot_payload(payload: &[u8]) -> PersistResult<LoadedRecord> {
    let raw: RawEnvelope = serde_json::from_slice(payload)
        .map_err(|e| PersistError::TypeMismatch(format!("envelope decode failed: {e}")))?;
    let snapshot: VehicleSnapshotV1 = serde_json::from_value(raw.snapshot)
        .map_err(|e| PersistError::TypeMismatch(format!("snapshot decode failed: {e}")))?;

    let warning = (raw.format_version != SNAPSHOT_FORMAT_VERSION).then(|| {
        let warning = CompatibilityWarning {
            found: raw.format_version,
            expected: SNAPSHOT_FORMAT_VERSION,
        };
        warn!("event=snapshot_version_mismatch found={} expected={}", warning.found, warning.expected);
        warning
    });

    let record = VehicleRecord::from_snapshot(snapshot)?;
    Ok(LoadedRecord { record, warning })
}
