//! Tick driver.
//!
//! The host-side frame loop: an ordered list of callbacks, each invoked once
//! per frame, followed by a pacing sleep. Callbacks deregister themselves by
//! returning [`TickControl::Remove`].

mod ctx;
mod driver;

pub use ctx::{TickControl, TickCtx, TickId};
pub use driver::{FrameReport, TickConfig, TickDriver, TickFn};
