//! # Timeslot Core Library
//!
//! Core logic for timeslot, a tracker of recurring time slots. Each slot
//! carries a countdown and a task checklist, and may reset itself every N
//! days. The `timeslot` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Reset engine**: pure evaluation of interval resets against a caller
//!   supplied `now`
//! - **Countdown**: a tick-driven session state machine with throttled
//!   persistence and suspension compensation, plus an async tick driver
//! - **Storage**: the [`SlotStore`] contract with SQLite and in-memory
//!   implementations, and TOML configuration
//!
//! ## Key Components
//!
//! - [`CountdownSession`]: live countdown for one slot
//! - [`SlotService`]: list refresh, creation and deletion
//! - [`SqliteSlotStore`]: persistent slot collection
//! - [`Config`]: application configuration

pub mod countdown;
pub mod error;
pub mod events;
pub mod reset;
pub mod service;
pub mod slot;
pub mod storage;

pub use countdown::{CountdownSession, CountdownState, DriverExit, Snapshot};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use reset::{evaluate, process_all, BatchOutcome};
pub use service::{RefreshReport, SlotService};
pub use slot::{NewSlot, SlotTimer, Task, TimeSlot, Window};
pub use storage::{Config, MemorySlotStore, SlotPatch, SlotStore, SqliteSlotStore};
