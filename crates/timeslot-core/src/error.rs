//! Core error types for timeslot-core.
//!
//! The reset engine is pure and never fails; everything that can fail goes
//! through the slot store, slot validation or the configuration file.
//! Configuration has its own [`ConfigError`] because only the CLI loads it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for timeslot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A slot or task id that does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

/// Slot store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open slot store at {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// Schema migration failed
    #[error("Slot store migration failed: {0}")]
    Migration(String),

    /// The persisted collection is corrupt or unreadable
    #[error("Failed to read slots: {0}")]
    Read(String),

    /// An upsert, bulk replace or delete did not go through
    #[error("Failed to write slots: {0}")]
    Write(String),

    /// The record was rejected before any write was attempted
    #[error("Rejected slot: {0}")]
    Validation(#[from] ValidationError),

    /// Delete or update referencing an unknown slot id
    #[error("Slot not found: {id}")]
    NotFound { id: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Slot validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Slot record without an id
    #[error("slot must have an id")]
    MissingId,

    /// Empty or whitespace-only title
    #[error("title must not be blank")]
    BlankTitle,

    /// Countdown duration outside the accepted range
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Validity window that cannot be used
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Empty checklist entry
    #[error("task text must not be blank")]
    BlankTask,

    /// Checklist entry whose text already exists in the slot
    #[error("task already exists: {0}")]
    DuplicateTask(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
