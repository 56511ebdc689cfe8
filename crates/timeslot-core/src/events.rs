use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change of a countdown session produces an Event.
/// Front ends render them; `CountdownCompleted` is where the alert fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CountdownResumed {
        slot_id: String,
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    CountdownPaused {
        slot_id: String,
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    CountdownCompleted {
        slot_id: String,
        at: DateTime<Utc>,
    },
    CountdownCancelled {
        slot_id: String,
        times_stopped: u32,
        at: DateTime<Utc>,
    },
    CountdownReset {
        slot_id: String,
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    /// Time spent suspended was charged against the countdown.
    BackgroundCompensated {
        slot_id: String,
        elapsed_secs: u64,
        seconds_left: u32,
        at: DateTime<Utc>,
    },
    TaskToggled {
        slot_id: String,
        task_id: String,
        completed: bool,
        at: DateTime<Utc>,
    },
}
