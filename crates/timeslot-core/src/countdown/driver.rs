//! Async tick driver for a [`CountdownSession`].
//!
//! Ticks the session once per `tick_interval` until the countdown stops
//! running or `shutdown` resolves. A wall-clock gap between ticks larger
//! than the suspension threshold means the process was not scheduled (laptop
//! lid closed, SIGSTOP, ...); the gap is charged through [`HostLifecycle`]
//! instead of being lost. Shorter stalls are caught up with extra ticks.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use super::clock::Clock;
use super::session::{CountdownSession, CountdownState, HostLifecycle};
use crate::events::Event;
use crate::storage::{CountdownConfig, SlotStore};

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The session was not running when the driver started.
    NotRunning,
    /// The session left the running state by itself.
    Finished(CountdownState),
    /// `shutdown` resolved first. The session was flushed and is still running.
    Shutdown,
}

pub async fn run<S, C, F, E>(
    session: &mut CountdownSession<'_, S>,
    config: &CountdownConfig,
    clock: &C,
    shutdown: F,
    mut on_event: E,
) -> DriverExit
where
    S: SlotStore + ?Sized,
    C: Clock + ?Sized,
    F: Future<Output = ()>,
    E: FnMut(&Event),
{
    if !session.is_ticking() {
        return DriverExit::NotRunning;
    }

    let period = config.tick_interval();
    let threshold = config.suspend_threshold().max(period * 2);
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut last = clock.now();
    // Wall time seen but not yet charged as a whole tick.
    let mut carry = Duration::ZERO;
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                session.flush();
                tracing::debug!(seconds_left = session.seconds_left(), "driver shut down");
                return DriverExit::Shutdown;
            }
            _ = interval.tick() => {
                let now = clock.now();
                let prev = std::mem::replace(&mut last, now);
                let gap = (now - prev).to_std().unwrap_or_default();

                if gap > threshold {
                    tracing::debug!(gap_secs = gap.as_secs(), "tick gap exceeds threshold");
                    carry = Duration::ZERO;
                    session.on_suspend(prev);
                    if let Some(event) = session.on_resume(now) {
                        on_event(&event);
                    }
                    interval.reset();
                } else {
                    let (due, rest) = ticks_due(carry + gap, period);
                    carry = rest;
                    if due > 1 {
                        tracing::debug!(due, "catching up on delayed ticks");
                    }
                    for _ in 0..due {
                        if let Some(event) = session.tick() {
                            on_event(&event);
                        }
                        if !session.is_ticking() {
                            break;
                        }
                    }
                }

                if !session.is_ticking() {
                    return DriverExit::Finished(session.state());
                }
            }
        }
    }
}

/// Whole ticks owed for `owed` wall time, at least one, plus the remainder.
fn ticks_due(owed: Duration, period: Duration) -> (u32, Duration) {
    let whole = owed.as_nanos() / period.as_nanos().max(1);
    let due = u32::try_from(whole).unwrap_or(u32::MAX).max(1);
    (due, owed.saturating_sub(period.saturating_mul(due)))
}
