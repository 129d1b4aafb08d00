use std::time::Duration;

use super::clock::{Clock, MonotonicClock};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Clock reading taken at the tick.
    pub now: Duration,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One `FrameClock` per tick loop. Delta time is clamped to avoid pathological
/// values when the loop is paused by a debugger or stalls on a slow frame.
#[derive(Debug, Clone)]
pub struct FrameClock<C: Clock = MonotonicClock> {
    clock: C,
    last: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl<C: Clock> FrameClock<C> {
    /// Creates a new clock with default clamps.
    ///
    /// Clamp rationale:
    /// - minimum prevents zero-dt behavior from tight loops on some platforms
    /// - maximum keeps a single stalled frame from dominating downstream timing
    pub fn new(clock: C) -> Self {
        Self::with_clamps(
            clock,
            Duration::from_micros(100), // 0.0001s
            Duration::from_millis(250), // 0.25s
        )
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(clock: C, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let last = clock.now();
        Self {
            clock,
            last,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.clock.now();
        let dt = now.saturating_sub(self.last).clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MonotonicClock::new())
    }
}
