//! SQLite-backed vehicle record snapshots.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use rusqlite::{Connection, OptionalExtension, params};

use crate::{config::RecordStoreConfig, core::record::VehicleRecord};

use super::{
    LoadedRecord, PersistError, PersistResult, RecordStore, SNAPSHOT_FORMAT_VERSION,
    decode_snapshot_payload, encode_snapshot_payload,
};

/// SQLite implementation of [`crate::persist::RecordStore`].
///
/// Every save appends one snapshot row; loading reads the newest.
pub struct SqliteRecordStore {
    conn: Connection,
    config: RecordStoreConfig,
}

impl SqliteRecordStore {
    /// Opens or creates a store at `path`.
    pub fn open(path: impl AsRef<Path>, config: RecordStoreConfig) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn, config)
    }

    /// Opens an in-memory store.
    pub fn open_in_memory(config: RecordStoreConfig) -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn, config)
    }

    fn init_connection(conn: Connection, config: RecordStoreConfig) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        if config.wal {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
        }
        Ok(Self { conn, config })
    }

    /// Writes `record` as a new snapshot row and returns its row id.
    pub fn write_snapshot(&mut self, record: &VehicleRecord) -> PersistResult<i64> {
        let payload = encode_snapshot_payload(record)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO snapshots(ts_ms, format_version, vehicle_label, payload) VALUES (?1, ?2, ?3, ?4)",
            params![now_ms() as i64, SNAPSHOT_FORMAT_VERSION, record.label(), payload],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Deletes all but the newest `keep` snapshots.
    pub fn compact(&mut self, keep: usize) -> PersistResult<usize> {
        let count = self.conn.execute(
            "DELETE FROM snapshots WHERE id NOT IN (SELECT id FROM snapshots ORDER BY id DESC LIMIT ?1)",
            params![keep as i64],
        )?;
        Ok(count)
    }

    /// Number of stored snapshot rows.
    pub fn snapshot_count(&self) -> PersistResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn load_latest_payload(&self) -> PersistResult<Option<Vec<u8>>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }
}

impl RecordStore for SqliteRecordStore {
    fn save(&mut self, record: &mut VehicleRecord) -> PersistResult<()> {
        let id = self.write_snapshot(record)?;
        if self.config.keep_snapshots > 0 {
            self.compact(self.config.keep_snapshots)?;
        }
        record.mark_saved();
        info!("event=record_save label={} snapshot_id={id}", record.label());
        Ok(())
    }

    fn load(&self) -> PersistResult<LoadedRecord> {
        let Some(payload) = self.load_latest_payload()? else {
            return Err(PersistError::Empty);
        };
        let loaded = decode_snapshot_payload(&payload)?;
        info!(
            "event=record_load label={} log_entries={} catalogue_entries={}",
            loaded.record.label(),
            loaded.record.log().len(),
            loaded.record.catalogue().len()
        );
        Ok(loaded)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
