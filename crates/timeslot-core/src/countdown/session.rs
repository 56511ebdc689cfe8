//! Countdown session for one slot.
//!
//! The session is a tick-driven state machine. It does not use internal
//! threads or read the clock - the caller feeds it `tick()` once per second
//! and reports host suspension through [`HostLifecycle`].
//!
//! ## State Transitions
//!
//! ```text
//! Paused <-> Running -> Completed
//!    \         /
//!     Cancelled            (stop, after confirmation)
//! any -> Paused            (reset)
//! ```
//!
//! State changes are applied in memory first and then written to the store
//! as a timer or task-list patch. A failed write never rolls back the
//! in-memory state; it is recorded for the caller to surface.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = CountdownSession::open(&store, "slot-id", &config.countdown)?;
//! session.resume();
//! // Once per second:
//! if let Some(Event::CountdownCompleted { .. }) = session.tick() { /* alert */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::display::{format_remaining, remaining_fraction};
use crate::error::{CoreError, StorageError};
use crate::events::Event;
use crate::slot::{Task, TimeSlot};
use crate::storage::{CountdownConfig, SlotPatch, SlotStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Paused,
    Running,
    /// Reached zero. Left only through reset.
    Completed,
    /// Stopped by the user. Left only through reset.
    Cancelled,
}

impl CountdownState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Derive the state from a persisted timer record.
    fn from_record(seconds_left: u32, is_running: bool) -> Self {
        if seconds_left == 0 {
            Self::Completed
        } else if is_running {
            Self::Running
        } else {
            Self::Paused
        }
    }
}

impl std::fmt::Display for CountdownState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Paused => "paused",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Proof that a stop was requested. Pass it to
/// [`CountdownSession::confirm_stop`] to cancel the countdown; drop it to
/// back out.
#[derive(Debug)]
#[must_use = "a stop request does nothing until confirmed"]
pub struct StopRequest {
    _private: (),
}

/// Host process suspension callbacks.
pub trait HostLifecycle {
    /// The host is about to stop running us.
    fn on_suspend(&mut self, at: DateTime<Utc>);
    /// The host is running us again.
    fn on_resume(&mut self, at: DateTime<Utc>) -> Option<Event>;
}

/// Render-ready view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub slot_id: String,
    pub title: String,
    pub state: CountdownState,
    pub seconds_left: u32,
    pub initial_seconds: u32,
    pub remaining: String,
    /// Share of the countdown still left, `0.0..=1.0`.
    pub remaining_fraction: f64,
    pub tasks: Vec<Task>,
    pub completed_tasks: usize,
    pub total_tasks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOrigin {
    /// Explicit user action or a transition that must land.
    Action,
    /// Throttled progress save while running.
    Checkpoint,
}

/// Live countdown for one slot, bound to a store.
pub struct CountdownSession<'s, S: SlotStore + ?Sized> {
    store: &'s S,
    slot: TimeSlot,
    state: CountdownState,
    checkpoint_every: u32,
    suspended_at: Option<DateTime<Utc>>,
    /// A checkpoint write has failed and not yet been followed by a success.
    checkpoint_failing: bool,
    write_error: Option<StorageError>,
}

impl<'s, S: SlotStore + ?Sized> CountdownSession<'s, S> {
    /// Load `slot_id` from the store and start a session on it.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id, or the store's read error.
    pub fn open(store: &'s S, slot_id: &str, config: &CountdownConfig) -> Result<Self, CoreError> {
        let slot = store.get_one(slot_id)?.ok_or_else(|| CoreError::NotFound {
            kind: "slot",
            id: slot_id.to_string(),
        })?;
        Ok(Self::from_slot(store, slot, config))
    }

    /// Start a session on an already loaded slot.
    pub fn from_slot(store: &'s S, mut slot: TimeSlot, config: &CountdownConfig) -> Self {
        let timer = &mut slot.timer;
        timer.seconds_left = timer.seconds_left.min(timer.initial_seconds);
        if timer.seconds_left == 0 {
            timer.is_running = false;
        }
        let state = CountdownState::from_record(timer.seconds_left, timer.is_running);
        tracing::debug!(slot_id = %slot.id, %state, seconds_left = timer.seconds_left, "session opened");

        Self {
            store,
            slot,
            state,
            checkpoint_every: config.checkpoint_every_secs.max(1),
            suspended_at: None,
            checkpoint_failing: false,
            write_error: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn seconds_left(&self) -> u32 {
        self.slot.timer.seconds_left
    }

    pub fn initial_seconds(&self) -> u32 {
        self.slot.timer.initial_seconds
    }

    pub fn tasks(&self) -> &[Task] {
        &self.slot.tasks
    }

    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    pub fn into_slot(self) -> TimeSlot {
        self.slot
    }

    /// Whether a tick driver should be running for this session.
    pub fn is_ticking(&self) -> bool {
        self.state == CountdownState::Running && self.slot.timer.seconds_left > 0
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    /// Take the most recent unreported write failure, if any.
    pub fn take_write_error(&mut self) -> Option<StorageError> {
        self.write_error.take()
    }

    pub fn snapshot(&self) -> Snapshot {
        let timer = &self.slot.timer;
        Snapshot {
            slot_id: self.slot.id.clone(),
            title: self.slot.title.clone(),
            state: self.state,
            seconds_left: timer.seconds_left,
            initial_seconds: timer.initial_seconds,
            remaining: format_remaining(timer.seconds_left),
            remaining_fraction: remaining_fraction(timer.seconds_left, timer.initial_seconds),
            tasks: self.slot.tasks.clone(),
            completed_tasks: self.slot.completed_tasks(),
            total_tasks: self.slot.tasks.len(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != CountdownState::Paused || self.slot.timer.seconds_left == 0 {
            return None;
        }
        self.set_state(CountdownState::Running);
        self.persist_timer(WriteOrigin::Action);
        Some(Event::CountdownResumed {
            slot_id: self.slot.id.clone(),
            seconds_left: self.seconds_left(),
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        self.set_state(CountdownState::Paused);
        self.suspended_at = None;
        self.persist_timer(WriteOrigin::Action);
        Some(Event::CountdownPaused {
            slot_id: self.slot.id.clone(),
            seconds_left: self.seconds_left(),
            at: Utc::now(),
        })
    }

    /// Pause when running, resume when paused.
    pub fn toggle(&mut self) -> Option<Event> {
        match self.state {
            CountdownState::Running => self.pause(),
            CountdownState::Paused => self.resume(),
            CountdownState::Completed | CountdownState::Cancelled => None,
        }
    }

    /// First half of a stop. Nothing changes until the request is confirmed.
    pub fn request_stop(&self) -> Option<StopRequest> {
        if self.state.is_terminal() {
            return None;
        }
        Some(StopRequest { _private: () })
    }

    /// Cancel the countdown. The display goes back to the full duration.
    pub fn confirm_stop(&mut self, _request: StopRequest) -> Option<Event> {
        // The countdown may have finished while the confirmation was pending.
        if self.state.is_terminal() {
            return None;
        }
        self.suspended_at = None;
        self.set_state(CountdownState::Cancelled);
        let timer = &mut self.slot.timer;
        timer.seconds_left = timer.initial_seconds;
        timer.times_stopped = timer.times_stopped.saturating_add(1);
        let times_stopped = timer.times_stopped;
        self.persist_timer(WriteOrigin::Action);
        tracing::info!(slot_id = %self.slot.id, times_stopped, "countdown cancelled");
        Some(Event::CountdownCancelled {
            slot_id: self.slot.id.clone(),
            times_stopped,
            at: Utc::now(),
        })
    }

    /// Back to the full duration, paused. Allowed from every state.
    ///
    /// A timer without a duration rewinds straight to `Completed`.
    pub fn reset(&mut self) -> Option<Event> {
        self.suspended_at = None;
        self.slot.timer.rewind();
        let timer = &self.slot.timer;
        self.set_state(CountdownState::from_record(timer.seconds_left, timer.is_running));
        self.persist_timer(WriteOrigin::Action);
        Some(Event::CountdownReset {
            slot_id: self.slot.id.clone(),
            seconds_left: self.seconds_left(),
            at: Utc::now(),
        })
    }

    /// Advance one second. Returns `CountdownCompleted` on the final tick.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_ticking() {
            return None;
        }
        let left = self.slot.timer.seconds_left - 1;
        self.slot.timer.seconds_left = left;
        if left == 0 {
            return Some(self.complete());
        }
        if left % self.checkpoint_every == 0 {
            tracing::debug!(slot_id = %self.slot.id, seconds_left = left, "checkpoint");
            self.persist_timer(WriteOrigin::Checkpoint);
        }
        None
    }

    /// Charge `elapsed_secs` of unobserved running time against the countdown.
    pub fn apply_elapsed(&mut self, elapsed_secs: u64) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        let charged = u32::try_from(elapsed_secs).unwrap_or(u32::MAX);
        let left = self.slot.timer.seconds_left.saturating_sub(charged);
        self.slot.timer.seconds_left = left;
        tracing::info!(
            slot_id = %self.slot.id,
            elapsed_secs,
            seconds_left = left,
            "compensated for suspension"
        );
        if left == 0 {
            return Some(self.complete());
        }
        self.persist_timer(WriteOrigin::Action);
        Some(Event::BackgroundCompensated {
            slot_id: self.slot.id.clone(),
            elapsed_secs,
            seconds_left: left,
            at: Utc::now(),
        })
    }

    /// Flip one task's completion and persist the whole list.
    ///
    /// An unknown id leaves the list unchanged, still writes it, and
    /// returns no event.
    pub fn toggle_task(&mut self, task_id: &str) -> Option<Event> {
        let found = self.slot.toggle_task(task_id);
        self.persist(SlotPatch::tasks(self.slot.tasks.clone()), WriteOrigin::Action);
        if !found {
            tracing::debug!(slot_id = %self.slot.id, task_id, "toggle of unknown task");
            return None;
        }
        let completed = self
            .slot
            .tasks
            .iter()
            .any(|t| t.id == task_id && t.completed);
        Some(Event::TaskToggled {
            slot_id: self.slot.id.clone(),
            task_id: task_id.to_string(),
            completed,
            at: Utc::now(),
        })
    }

    /// Write the current timer record, e.g. when the session is closed.
    /// Closing does not stop a running countdown.
    pub fn flush(&mut self) {
        self.persist_timer(WriteOrigin::Action);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_state(&mut self, state: CountdownState) {
        self.state = state;
        self.slot.timer.is_running = state == CountdownState::Running;
    }

    fn complete(&mut self) -> Event {
        self.suspended_at = None;
        self.slot.timer.seconds_left = 0;
        self.set_state(CountdownState::Completed);
        self.persist_timer(WriteOrigin::Action);
        tracing::info!(slot_id = %self.slot.id, "countdown completed");
        Event::CountdownCompleted {
            slot_id: self.slot.id.clone(),
            at: Utc::now(),
        }
    }

    fn persist_timer(&mut self, origin: WriteOrigin) {
        self.persist(SlotPatch::timer(self.slot.timer.clone()), origin);
    }

    fn persist(&mut self, patch: SlotPatch, origin: WriteOrigin) {
        match self.store.update_one(&self.slot.id, &patch) {
            Ok(()) => self.checkpoint_failing = false,
            Err(e) => {
                if origin == WriteOrigin::Checkpoint {
                    if self.checkpoint_failing {
                        tracing::debug!(slot_id = %self.slot.id, error = %e, "checkpoint still failing");
                        return;
                    }
                    self.checkpoint_failing = true;
                }
                tracing::warn!(slot_id = %self.slot.id, error = %e, "failed to persist countdown");
                self.write_error = Some(e);
            }
        }
    }
}

impl<S: SlotStore + ?Sized> HostLifecycle for CountdownSession<'_, S> {
    fn on_suspend(&mut self, at: DateTime<Utc>) {
        if self.state == CountdownState::Running {
            self.suspended_at = Some(at);
        }
    }

    fn on_resume(&mut self, at: DateTime<Utc>) -> Option<Event> {
        let since = self.suspended_at.take()?;
        let elapsed = (at - since).num_seconds().max(0).unsigned_abs();
        self.apply_elapsed(elapsed)
    }
}
