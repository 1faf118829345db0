//! Service layer
//!
//! The watch loop and the time source it runs on.

pub mod clock;
pub mod watch_loop;

pub use clock::{Clock, SystemClock};
pub use watch_loop::{SessionEnd, SessionStats, WatchLoop, WatchLoopConfig};
