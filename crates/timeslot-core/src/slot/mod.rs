//! Time slot records.
//!
//! A [`TimeSlot`] bundles a countdown ([`SlotTimer`]) with a task checklist
//! and a validity window. Field names on the wire follow the persisted
//! collection format (camelCase), so existing collections load unchanged.

mod checklist;
mod create;

pub use create::{NewSlot, Window, DEFAULT_PALETTE};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of generated slot, timer and task ids.
const ID_LEN: usize = 10;

/// Generate a short opaque id.
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "task")]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            text: text.into(),
            completed: false,
        }
    }
}

/// The countdown sub-record embedded in every slot.
///
/// `initial_*` fields are fixed at creation. `seconds_left` is the only
/// field that changes on every tick; `hours_left`/`minutes_left` mirror the
/// creation values for display and are never used for countdown math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotTimer {
    pub id: String,
    #[serde(default)]
    pub initial_hours: u32,
    #[serde(default)]
    pub initial_minutes: u32,
    #[serde(default)]
    pub initial_seconds: u32,
    #[serde(default)]
    pub seconds_left: u32,
    #[serde(default)]
    pub hours_left: u32,
    #[serde(default)]
    pub minutes_left: u32,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub times_stopped: u32,
}

impl SlotTimer {
    /// A fresh, paused timer of `hours`:`minutes`.
    pub fn new(hours: u32, minutes: u32) -> Self {
        let total = hours * 3600 + minutes * 60;
        Self {
            id: generate_id(),
            initial_hours: hours,
            initial_minutes: minutes,
            initial_seconds: total,
            seconds_left: total,
            hours_left: hours,
            minutes_left: minutes,
            is_running: false,
            times_stopped: 0,
        }
    }

    /// Put the timer back to its initial duration, not running.
    pub fn rewind(&mut self) {
        self.seconds_left = self.initial_seconds;
        self.is_running = false;
    }
}

/// A user-defined tracked interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "color_theme", default = "default_color")]
    pub color_theme: String,
    /// Anchor for reset arithmetic. Only the reset engine moves it.
    pub date_created: DateTime<Utc>,
    /// Whole days between automatic resets; `<= 0` disables them.
    #[serde(default)]
    pub reset_intervals: i64,
    #[serde(default)]
    pub duration_days: i64,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub timer: SlotTimer,
}

fn default_color() -> String {
    DEFAULT_PALETTE[0].to_string()
}

impl TimeSlot {
    pub fn auto_reset_enabled(&self) -> bool {
        self.reset_intervals > 0
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// A paused two-minute slot created at 2024-01-01 09:00 UTC.
    pub fn slot() -> TimeSlot {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        TimeSlot {
            id: "slot-1".into(),
            title: "Deep work".into(),
            description: None,
            start: created,
            end: created + chrono::Duration::days(7),
            color_theme: default_color(),
            date_created: created,
            reset_intervals: 0,
            duration_days: 7,
            tasks: vec![
                Task {
                    id: "t1".into(),
                    text: "outline".into(),
                    completed: false,
                },
                Task {
                    id: "t2".into(),
                    text: "draft".into(),
                    completed: true,
                },
            ],
            timer: SlotTimer {
                id: "timer-1".into(),
                ..SlotTimer::new(0, 2)
            },
        }
    }
}
