//! Time subsystem.
//!
//! Provides stable, testable timing utilities without coupling to the tick loop.
//! Intended usage:
//! - one `Clock` shared by the loop and anything measuring work inside a frame
//! - one `FrameClock` per tick loop, `tick()` once per frame
//! - a `FrameBudget` started at the top of any frame-bounded unit of work

mod budget;
mod clock;
mod frame_clock;
mod rate;

pub use budget::FrameBudget;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use frame_clock::{FrameClock, FrameTime};
pub use rate::{FrameRate, FrameRateError};
