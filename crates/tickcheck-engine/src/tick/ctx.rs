use std::time::Duration;

use crate::time::FrameTime;

/// Control directive returned by tick callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickControl {
    /// Keep the callback registered for the next frame.
    Continue,
    /// Deregister the callback once the current frame finishes.
    Remove,
}

/// Identifies a registered tick callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TickId(pub(crate) u64);

/// Per-frame context passed to every tick callback.
#[derive(Debug, Copy, Clone)]
pub struct TickCtx {
    pub time: FrameTime,
    /// Full frame period of the driving loop.
    pub period: Duration,
}

impl TickCtx {
    pub fn new(time: FrameTime, period: Duration) -> Self {
        Self { time, period }
    }
}
