//! SQLite-backed slot store.
//!
//! Each slot is one row holding its JSON record, so an upsert touches a
//! single row instead of rewriting the whole collection. `position` keeps
//! insertion order for listing.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{
    data_dir, ensure_id, from_record, merge_shallow, migrations, to_record, Config, SlotStore,
};
use crate::error::StorageError;
use crate::slot::TimeSlot;

const DB_FILE: &str = "timeslot.db";

pub struct SqliteSlotStore {
    conn: Connection,
}

fn read_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Read(e.to_string())
}

fn write_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Write(e.to_string())
}

impl SqliteSlotStore {
    /// Default database location: `TIMESLOT_DB`, else `<data_dir>/timeslot.db`.
    pub fn default_path() -> Result<PathBuf, StorageError> {
        if let Some(path) = std::env::var_os("TIMESLOT_DB") {
            return Ok(PathBuf::from(path));
        }
        let dir = data_dir().map_err(|e| StorageError::Open {
            path: PathBuf::from(DB_FILE),
            message: e.to_string(),
        })?;
        Ok(dir.join(DB_FILE))
    }

    /// Open the database at the default location.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&Self::default_path()?)
    }

    /// Open the database named by `config`, unless `TIMESLOT_DB` overrides it.
    pub fn open_with(config: &Config) -> Result<Self, StorageError> {
        match config.database_override() {
            Some(path) if std::env::var_os("TIMESLOT_DB").is_none() => Self::open_at(&path),
            _ => Self::open(),
        }
    }

    /// Open (creating if needed) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::Open {
            path: PathBuf::from(":memory:"),
            message: e.to_string(),
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        migrations::migrate(&conn).map_err(|e| StorageError::Migration(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn stored_record(&self, id: &str) -> Result<Option<Value>, StorageError> {
        let body: Option<String> = self
            .conn
            .query_row("SELECT body FROM slots WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(read_err)?;
        body.map(|b| serde_json::from_str(&b).map_err(read_err))
            .transpose()
    }
}

impl SlotStore for SqliteSlotStore {
    fn get_all(&self) -> Result<Vec<TimeSlot>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM slots ORDER BY position, rowid")
            .map_err(read_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(read_err)?;

        let mut slots = Vec::new();
        for row in rows {
            let (id, body) = row.map_err(read_err)?;
            let record: Value = serde_json::from_str(&body)
                .map_err(|e| StorageError::Read(format!("slot {id}: {e}")))?;
            slots.push(from_record(&record)?);
        }
        Ok(slots)
    }

    fn get_one(&self, id: &str) -> Result<Option<TimeSlot>, StorageError> {
        self.stored_record(id)?
            .map(|record| from_record(&record))
            .transpose()
    }

    fn save_one(&self, slot: &TimeSlot) -> Result<(), StorageError> {
        ensure_id(slot)?;
        let incoming = to_record(slot)?;
        let now = Utc::now().to_rfc3339();

        match self.stored_record(&slot.id)? {
            Some(mut stored) => {
                merge_shallow(&mut stored, incoming);
                self.conn
                    .execute(
                        "UPDATE slots SET body = ?1, updated_at = ?2 WHERE id = ?3",
                        params![stored.to_string(), now, slot.id],
                    )
                    .map_err(write_err)?;
                tracing::debug!(slot_id = %slot.id, "updated slot");
            }
            None => {
                self.conn
                    .execute(
                        "INSERT INTO slots (id, position, body, updated_at)
                         VALUES (?1, (SELECT COALESCE(MAX(position), -1) + 1 FROM slots), ?2, ?3)",
                        params![slot.id, incoming.to_string(), now],
                    )
                    .map_err(write_err)?;
                tracing::debug!(slot_id = %slot.id, "inserted slot");
            }
        }
        Ok(())
    }

    fn save_all(&self, slots: &[TimeSlot]) -> Result<(), StorageError> {
        for slot in slots {
            ensure_id(slot)?;
        }
        let bodies = slots
            .iter()
            .map(|s| to_record(s).map(|r| r.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.unchecked_transaction().map_err(write_err)?;
        tx.execute("DELETE FROM slots", []).map_err(write_err)?;
        {
            let mut insert = tx
                .prepare(
                    "INSERT INTO slots (id, position, body, updated_at) VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(write_err)?;
            for (position, (slot, body)) in slots.iter().zip(&bodies).enumerate() {
                insert
                    .execute(params![slot.id, position as i64, body, now])
                    .map_err(write_err)?;
            }
        }
        tx.commit().map_err(write_err)?;
        tracing::info!(count = slots.len(), "replaced slot collection");
        Ok(())
    }

    fn delete_one(&self, id: &str) -> Result<(), StorageError> {
        let removed = self
            .conn
            .execute("DELETE FROM slots WHERE id = ?1", params![id])
            .map_err(write_err)?;
        if removed == 0 {
            tracing::warn!(slot_id = %id, "delete of unknown slot");
            return Err(StorageError::NotFound { id: id.to_string() });
        }
        tracing::info!(slot_id = %id, "deleted slot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::fixtures;
    use crate::storage::SlotPatch;

    fn slot_with_id(id: &str) -> TimeSlot {
        TimeSlot {
            id: id.into(),
            ..fixtures::slot()
        }
    }

    #[test]
    fn preserves_insertion_order() {
        let store = SqliteSlotStore::open_in_memory().unwrap();
        for id in ["c", "a", "b"] {
            store.save_one(&slot_with_id(id)).unwrap();
        }
        let ids: Vec<_> = store.get_all().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn save_one_merges_over_existing_row() {
        let store = SqliteSlotStore::open_in_memory().unwrap();
        let mut slot = slot_with_id("x");
        slot.description = Some("notes".into());
        store.save_one(&slot).unwrap();

        slot.description = None;
        slot.timer.seconds_left = 5;
        store.save_one(&slot).unwrap();

        let stored = store.get_one("x").unwrap().unwrap();
        assert_eq!(stored.description.as_deref(), Some("notes"));
        assert_eq!(stored.timer.seconds_left, 5);
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn save_all_replaces_everything() {
        let store = SqliteSlotStore::open_in_memory().unwrap();
        store.save_one(&slot_with_id("old")).unwrap();
        store
            .save_all(&[slot_with_id("n1"), slot_with_id("n2")])
            .unwrap();
        let ids: Vec<_> = store.get_all().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["n1", "n2"]);
    }

    #[test]
    fn delete_and_update_unknown_ids() {
        let store = SqliteSlotStore::open_in_memory().unwrap();
        assert!(matches!(
            store.delete_one("ghost"),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            store.update_one("ghost", &SlotPatch::default()),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn corrupt_row_is_a_read_error() {
        let store = SqliteSlotStore::open_in_memory().unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO slots (id, position, body) VALUES ('bad', 0, '{not json')",
                [],
            )
            .unwrap();
        assert!(matches!(store.get_all(), Err(StorageError::Read(_))));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("slots.db");
        {
            let store = SqliteSlotStore::open_at(&path).unwrap();
            store.save_one(&slot_with_id("kept")).unwrap();
        }
        let store = SqliteSlotStore::open_at(&path).unwrap();
        assert_eq!(store.get_all().unwrap()[0].id, "kept");
    }
}
