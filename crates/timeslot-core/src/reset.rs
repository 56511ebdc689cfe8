//! Interval-based auto-reset.
//!
//! A slot with `reset_intervals = N > 0` gets its timer reinitialized once
//! `N` whole days have elapsed since `date_created`. The anchor advances by
//! whole cycles rather than jumping to `now`, so a partially elapsed cycle
//! carries over to the next evaluation.
//!
//! Both functions are pure: `now` is supplied by the caller.

use std::borrow::Cow;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::slot::TimeSlot;

/// Result of running [`process_all`] over a collection.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub slots: Vec<TimeSlot>,
    /// True iff at least one slot was reset.
    pub changed: bool,
}

/// Number of whole reset cycles elapsed for `slot` at `now`, if any.
pub fn elapsed_cycles(slot: &TimeSlot, now: DateTime<Utc>) -> Option<i64> {
    if slot.reset_intervals <= 0 {
        return None;
    }
    let days_elapsed = (now - slot.date_created).num_days();
    if days_elapsed < slot.reset_intervals {
        return None;
    }
    Some(days_elapsed / slot.reset_intervals)
}

/// Evaluate one slot.
///
/// Returns `Cow::Borrowed(slot)` when no reset is due and `Cow::Owned` with
/// the reset slot otherwise.
pub fn evaluate(slot: &TimeSlot, now: DateTime<Utc>) -> Cow<'_, TimeSlot> {
    match reset_if_due(slot, now) {
        Some(reset) => Cow::Owned(reset),
        None => Cow::Borrowed(slot),
    }
}

/// Evaluate every slot independently, preserving order.
pub fn process_all(slots: Vec<TimeSlot>, now: DateTime<Utc>) -> BatchOutcome {
    let mut changed = false;
    let mut out = Vec::with_capacity(slots.len());
    for slot in slots {
        match reset_if_due(&slot, now) {
            Some(reset) => {
                changed = true;
                out.push(reset);
            }
            None => out.push(slot),
        }
    }
    BatchOutcome {
        slots: out,
        changed,
    }
}

fn reset_if_due(slot: &TimeSlot, now: DateTime<Utc>) -> Option<TimeSlot> {
    let cycles = elapsed_cycles(slot, now)?;
    let advance = Duration::try_days(cycles * slot.reset_intervals)?;
    let anchor = slot.date_created.checked_add_signed(advance)?;

    tracing::info!(
        slot_id = %slot.id,
        cycles,
        new_anchor = %anchor,
        "reset interval elapsed, reinitializing timer"
    );

    let mut reset = slot.clone();
    reset.date_created = anchor;
    let timer = &mut reset.timer;
    timer.rewind();
    timer.hours_left = timer.initial_hours;
    timer.minutes_left = timer.initial_minutes;
    timer.times_stopped = 0;
    Some(reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::fixtures;

    fn hours(h: i64) -> Duration {
        Duration::hours(h)
    }

    #[test]
    fn disabled_interval_is_identity() {
        let slot = fixtures::slot();
        let now = slot.date_created + Duration::days(400);
        assert!(matches!(evaluate(&slot, now), Cow::Borrowed(_)));

        let mut negative = fixtures::slot();
        negative.reset_intervals = -3;
        assert!(matches!(evaluate(&negative, now), Cow::Borrowed(_)));
    }

    #[test]
    fn not_due_before_interval() {
        let mut slot = fixtures::slot();
        slot.reset_intervals = 2;
        let now = slot.date_created + hours(47);
        assert!(matches!(evaluate(&slot, now), Cow::Borrowed(_)));
    }

    #[test]
    fn reset_reinitializes_timer_and_keeps_tasks() {
        let mut slot = fixtures::slot();
        slot.reset_intervals = 1;
        slot.timer.seconds_left = 17;
        slot.timer.is_running = true;
        slot.timer.times_stopped = 4;
        let now = slot.date_created + hours(30);

        let result = evaluate(&slot, now).into_owned();
        assert_eq!(result.date_created, slot.date_created + Duration::days(1));
        assert_eq!(result.timer.seconds_left, slot.timer.initial_seconds);
        assert!(!result.timer.is_running);
        assert_eq!(result.timer.times_stopped, 0);
        assert_eq!(result.timer.hours_left, slot.timer.initial_hours);
        assert_eq!(result.timer.minutes_left, slot.timer.initial_minutes);
        assert_eq!(result.tasks, slot.tasks);
        assert_eq!(result.title, slot.title);
    }

    #[test]
    fn multiple_missed_cycles_keep_partial_cycle() {
        let mut slot = fixtures::slot();
        slot.reset_intervals = 3;
        // 10 days and 5 hours later: 3 full cycles (9 days) have passed.
        let now = slot.date_created + Duration::days(10) + hours(5);
        let result = evaluate(&slot, now).into_owned();
        assert_eq!(result.date_created, slot.date_created + Duration::days(9));

        // One day into the next cycle: nothing to do yet.
        assert!(matches!(evaluate(&result, now), Cow::Borrowed(_)));
    }

    #[test]
    fn clock_moving_backwards_never_resets() {
        let mut slot = fixtures::slot();
        slot.reset_intervals = 1;
        let now = slot.date_created - Duration::days(5);
        assert!(matches!(evaluate(&slot, now), Cow::Borrowed(_)));
    }

    #[test]
    fn batch_reports_changes() {
        let empty = process_all(Vec::new(), chrono::Utc::now());
        assert!(empty.slots.is_empty());
        assert!(!empty.changed);

        let mut due = fixtures::slot();
        due.id = "due".into();
        due.reset_intervals = 1;
        let idle = fixtures::slot();
        let now = due.date_created + Duration::days(2);

        let outcome = process_all(vec![idle.clone(), due.clone()], now);
        assert!(outcome.changed);
        assert_eq!(outcome.slots[0], idle);
        assert_eq!(outcome.slots[1].id, "due");
        assert_eq!(outcome.slots[1].date_created, due.date_created + Duration::days(2));

        let unchanged = process_all(vec![idle.clone()], now);
        assert!(!unchanged.changed);
        assert_eq!(unchanged.slots, vec![idle]);
    }
}
