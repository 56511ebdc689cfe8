mod config;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use config::{Config, CountdownConfig, DisplayConfig, StorageConfig};
pub use memory::MemorySlotStore;
pub use sqlite::SqliteSlotStore;

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{StorageError, ValidationError};
use crate::slot::{SlotTimer, Task, TimeSlot};

/// Returns the timeslot data directory, creating it if needed.
///
/// `TIMESLOT_HOME` overrides the location entirely. Otherwise this is
/// `~/.config/timeslot/`, or `~/.config/timeslot-dev/` when
/// `TIMESLOT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("TIMESLOT_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TIMESLOT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("timeslot-dev")
            } else {
                base_dir.join("timeslot")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Repository for time slot records.
///
/// Every operation is a read-modify-write against the shared collection.
/// Writers are not coordinated: when a countdown session and the reset
/// flow touch the same slot, the later write wins.
pub trait SlotStore {
    /// Load the whole collection in insertion order.
    ///
    /// Fails with [`StorageError::Read`] on corrupt or unreadable data.
    fn get_all(&self) -> Result<Vec<TimeSlot>, StorageError>;

    /// Insert `slot`, or shallow-merge it over the stored record with the
    /// same id: top-level fields present in the incoming record override,
    /// fields it omits keep their stored value.
    fn save_one(&self, slot: &TimeSlot) -> Result<(), StorageError>;

    /// Replace the whole collection. No merging.
    fn save_all(&self, slots: &[TimeSlot]) -> Result<(), StorageError>;

    /// Remove one slot. Unknown ids fail with [`StorageError::NotFound`].
    fn delete_one(&self, id: &str) -> Result<(), StorageError>;

    fn get_one(&self, id: &str) -> Result<Option<TimeSlot>, StorageError> {
        Ok(self.get_all()?.into_iter().find(|s| s.id == id))
    }

    /// Apply a partial update to an existing slot.
    fn update_one(&self, id: &str, patch: &SlotPatch) -> Result<(), StorageError> {
        let mut slot = self.get_one(id)?.ok_or_else(|| StorageError::NotFound {
            id: id.to_string(),
        })?;
        patch.apply(&mut slot);
        self.save_one(&slot)
    }
}

/// Fields to overwrite on an existing slot. `None` leaves a field alone.
///
/// Sessions write the timer and the checklist separately so that neither
/// clobbers the other.
#[derive(Debug, Clone, Default)]
pub struct SlotPatch {
    pub tasks: Option<Vec<Task>>,
    pub timer: Option<SlotTimer>,
}

impl SlotPatch {
    pub fn timer(timer: SlotTimer) -> Self {
        Self {
            timer: Some(timer),
            ..Self::default()
        }
    }

    pub fn tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Some(tasks),
            ..Self::default()
        }
    }

    pub fn apply(&self, slot: &mut TimeSlot) {
        if let Some(tasks) = &self.tasks {
            slot.tasks = tasks.clone();
        }
        if let Some(timer) = &self.timer {
            slot.timer = timer.clone();
        }
    }
}

/// Reject records that cannot be addressed by id.
pub(crate) fn ensure_id(slot: &TimeSlot) -> Result<(), StorageError> {
    if slot.id.trim().is_empty() {
        return Err(ValidationError::MissingId.into());
    }
    Ok(())
}

pub(crate) fn to_record(slot: &TimeSlot) -> Result<Value, StorageError> {
    serde_json::to_value(slot).map_err(|e| StorageError::Write(e.to_string()))
}

/// Decode a stored record. Records that only carry the legacy `color` key
/// take it as their `color_theme`.
pub(crate) fn from_record(record: &Value) -> Result<TimeSlot, StorageError> {
    let mut slot = TimeSlot::deserialize(record).map_err(|e| StorageError::Read(e.to_string()))?;
    if record.get("color_theme").is_none() {
        if let Some(color) = record.get("color").and_then(Value::as_str) {
            slot.color_theme = color.to_string();
        }
    }
    Ok(slot)
}

/// Overlay the top-level fields of `incoming` onto `stored`.
pub(crate) fn merge_shallow(stored: &mut Value, incoming: Value) {
    match incoming {
        Value::Object(fields) if stored.is_object() => {
            if let Some(target) = stored.as_object_mut() {
                for (key, value) in fields {
                    target.insert(key, value);
                }
            }
        }
        other => *stored = other,
    }
}

/// Import a collection exported as a single serialized blob.
///
/// Accepts a bare JSON array of slots, or an object holding the array (or
/// its string encoding) under `"timers"`. Each slot is upserted. Nothing
/// is written unless every slot has an id and a non-zero timer.
/// Returns the number of slots written.
pub fn import_blob<S: SlotStore + ?Sized>(store: &S, blob: &str) -> Result<usize, StorageError> {
    let value: Value = serde_json::from_str(blob).map_err(|e| StorageError::Read(e.to_string()))?;
    let list = match value {
        list @ Value::Array(_) => list,
        Value::Object(mut map) => match map.remove("timers") {
            Some(Value::String(encoded)) => serde_json::from_str(&encoded)
                .map_err(|e| StorageError::Read(e.to_string()))?,
            Some(list @ Value::Array(_)) => list,
            _ => return Err(StorageError::Read("no \"timers\" collection in blob".into())),
        },
        _ => return Err(StorageError::Read("expected a JSON array of slots".into())),
    };

    let Value::Array(items) = list else {
        return Err(StorageError::Read("expected a JSON array of slots".into()));
    };
    let slots = items.iter().map(from_record).collect::<Result<Vec<_>, _>>()?;
    for slot in &slots {
        ensure_id(slot)?;
        if slot.timer.initial_seconds == 0 {
            return Err(ValidationError::InvalidDuration(format!(
                "slot {} has a zero-length timer",
                slot.id
            ))
            .into());
        }
    }
    for slot in &slots {
        store.save_one(slot)?;
    }
    tracing::info!(count = slots.len(), "imported slot collection");
    Ok(slots.len())
}
