//! Slot list operations on top of a [`SlotStore`].
//!
//! This is what a front end calls when it shows the slot list: `refresh`
//! applies due interval resets and persists them, the rest are thin
//! validated wrappers around the store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::countdown::CountdownSession;
use crate::error::{CoreError, Result, StorageError};
use crate::reset::process_all;
use crate::slot::{NewSlot, Task, TimeSlot};
use crate::storage::{CountdownConfig, SlotPatch, SlotStore};

/// Outcome of [`SlotService::refresh`].
///
/// A refresh never fails outright: a store error is carried in `error`
/// next to the best collection available.
#[derive(Debug, Serialize)]
pub struct RefreshReport {
    pub slots: Vec<TimeSlot>,
    /// At least one slot was reset.
    pub changed: bool,
    #[serde(skip)]
    pub error: Option<StorageError>,
}

pub struct SlotService<S> {
    store: S,
}

impl<S: SlotStore> SlotService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load every slot, apply due resets and persist the result.
    ///
    /// - unreadable store: empty list plus the read error
    /// - nothing due: the loaded list, no write
    /// - bulk write fails: the evaluated list plus the write error
    pub fn refresh(&self, now: DateTime<Utc>) -> RefreshReport {
        let slots = match self.store.get_all() {
            Ok(slots) => slots,
            Err(e) => {
                tracing::warn!(error = %e, "could not load slots, showing an empty list");
                return RefreshReport {
                    slots: Vec::new(),
                    changed: false,
                    error: Some(e),
                };
            }
        };

        let outcome = process_all(slots, now);
        if !outcome.changed {
            return RefreshReport {
                slots: outcome.slots,
                changed: false,
                error: None,
            };
        }

        if let Err(e) = self.store.save_all(&outcome.slots) {
            tracing::warn!(error = %e, "could not persist reset slots");
            return RefreshReport {
                slots: outcome.slots,
                changed: true,
                error: Some(e),
            };
        }

        match self.store.get_all() {
            Ok(slots) => RefreshReport {
                slots,
                changed: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not reload slots after reset");
                RefreshReport {
                    slots: outcome.slots,
                    changed: true,
                    error: Some(e),
                }
            }
        }
    }

    pub fn list(&self) -> Result<Vec<TimeSlot>> {
        Ok(self.store.get_all()?)
    }

    pub fn get(&self, id: &str) -> Result<TimeSlot> {
        self.store.get_one(id)?.ok_or_else(|| not_found(id))
    }

    /// Validate `new` and store it as a fresh slot.
    pub fn create(&self, new: NewSlot, now: DateTime<Utc>) -> Result<TimeSlot> {
        let slot = new.build(now)?;
        self.store.save_one(&slot)?;
        tracing::info!(slot_id = %slot.id, title = %slot.title, "created slot");
        Ok(slot)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_one(id).map_err(|e| match e {
            StorageError::NotFound { id } => not_found(&id),
            other => other.into(),
        })
    }

    pub fn add_task(&self, slot_id: &str, text: &str) -> Result<Task> {
        let mut slot = self.get(slot_id)?;
        let task = slot.add_task(text)?.clone();
        self.store
            .update_one(slot_id, &SlotPatch::tasks(slot.tasks))?;
        Ok(task)
    }

    pub fn remove_task(&self, slot_id: &str, task_id: &str) -> Result<Task> {
        let mut slot = self.get(slot_id)?;
        let task = slot.remove_task(task_id)?;
        self.store
            .update_one(slot_id, &SlotPatch::tasks(slot.tasks))?;
        Ok(task)
    }

    /// Start a countdown session. The slot is fully loaded before the
    /// session exists, so no tick can run against a partial record.
    pub fn open_session(
        &self,
        id: &str,
        config: &CountdownConfig,
    ) -> Result<CountdownSession<'_, S>, CoreError> {
        CountdownSession::open(&self.store, id, config)
    }
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        kind: "slot",
        id: id.to_string(),
    }
}
