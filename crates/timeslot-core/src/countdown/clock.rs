use chrono::{DateTime, Utc};

/// Source of wall-clock time for the host side of a session.
///
/// The countdown itself only advances on ticks; wall-clock readings are used
/// to timestamp suspension and resumption.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}
