mod clock;
mod display;
pub mod driver;
mod session;

pub use clock::{Clock, SystemClock};
pub use display::{format_remaining, remaining_fraction};
pub use driver::DriverExit;
pub use session::{CountdownSession, CountdownState, HostLifecycle, Snapshot, StopRequest};
