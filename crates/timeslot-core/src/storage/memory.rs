//! In-process slot store.
//!
//! Keeps serialized records so merge semantics match the SQLite store.
//! Reads and writes can be made to fail, which the countdown and refresh
//! tests use to exercise degraded paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::{ensure_id, from_record, merge_shallow, to_record, SlotStore};
use crate::error::StorageError;
use crate::slot::TimeSlot;

#[derive(Debug, Default)]
pub struct MemorySlotStore {
    records: Mutex<Vec<Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(slots: &[TimeSlot]) -> Result<Self, StorageError> {
        let store = Self::new();
        store.save_all(slots)?;
        store.writes.store(0, Ordering::SeqCst);
        Ok(store)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, Vec<Value>>, StorageError> {
        self.records
            .lock()
            .map_err(|_| StorageError::Write("slot store lock poisoned".into()))
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write("writes disabled".into()));
        }
        Ok(())
    }

    fn committed(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl SlotStore for MemorySlotStore {
    fn get_all(&self) -> Result<Vec<TimeSlot>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Read("reads disabled".into()));
        }
        self.records()?.iter().map(from_record).collect()
    }

    fn save_one(&self, slot: &TimeSlot) -> Result<(), StorageError> {
        ensure_id(slot)?;
        self.check_write()?;
        let incoming = to_record(slot)?;
        let mut records = self.records()?;
        match records
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(slot.id.as_str()))
        {
            Some(stored) => merge_shallow(stored, incoming),
            None => records.push(incoming),
        }
        self.committed();
        Ok(())
    }

    fn save_all(&self, slots: &[TimeSlot]) -> Result<(), StorageError> {
        for slot in slots {
            ensure_id(slot)?;
        }
        self.check_write()?;
        let fresh = slots.iter().map(to_record).collect::<Result<Vec<_>, _>>()?;
        *self.records()? = fresh;
        self.committed();
        Ok(())
    }

    fn delete_one(&self, id: &str) -> Result<(), StorageError> {
        self.check_write()?;
        let mut records = self.records()?;
        let before = records.len();
        records.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        if records.len() == before {
            return Err(StorageError::NotFound { id: id.to_string() });
        }
        self.committed();
        Ok(())
    }
}
