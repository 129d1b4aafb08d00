use std::fmt;
use std::thread;
use std::time::Duration;

use crate::time::{Clock, FrameClock, FrameRate, MonotonicClock};

use super::ctx::{TickControl, TickCtx, TickId};

/// Boxed per-frame callback.
pub type TickFn = Box<dyn FnMut(&TickCtx) -> TickControl>;

/// Tick loop configuration.
#[derive(Debug, Copy, Clone)]
pub struct TickConfig {
    pub rate: FrameRate,
    /// Sleep out the remainder of each frame. Disable for batch runs and tests.
    pub sleep: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            rate: FrameRate::DEFAULT,
            sleep: true,
        }
    }
}

/// Summary of one driven frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Time spent inside callbacks.
    pub spent: Duration,
    pub invoked: usize,
    pub removed: usize,
}

struct Entry {
    id: TickId,
    callback: TickFn,
}

/// Fixed-rate tick driver.
///
/// Holds an ordered list of callbacks and invokes each exactly once per frame,
/// in registration order. With `sleep` enabled, the remainder of the frame
/// period (measured from the frame's start) is slept away after the callbacks
/// return.
pub struct TickDriver<C: Clock + Clone = MonotonicClock> {
    config: TickConfig,
    clock: C,
    frame_clock: FrameClock<C>,
    entries: Vec<Entry>,
    next_id: u64,
}

impl TickDriver {
    /// Wall-clock driver.
    pub fn new(config: TickConfig) -> Self {
        Self::with_clock(MonotonicClock::new(), config)
    }
}

impl<C: Clock + Clone> TickDriver<C> {
    pub fn with_clock(clock: C, config: TickConfig) -> Self {
        Self {
            config,
            frame_clock: FrameClock::new(clock.clone()),
            clock,
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_registered(&self, id: TickId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Appends a callback; it runs after every callback registered before it.
    pub fn register<F>(&mut self, callback: F) -> TickId
    where
        F: FnMut(&TickCtx) -> TickControl + 'static,
    {
        let id = TickId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            callback: Box::new(callback),
        });
        log::trace!("tick callback {} registered", id.0);
        id
    }

    /// Removes a callback. Returns `false` if `id` was not registered.
    pub fn deregister(&mut self, id: TickId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Runs one frame without pacing.
    pub fn step(&mut self) -> FrameReport {
        let started = self.clock.now();
        let ctx = TickCtx::new(self.frame_clock.tick(), self.config.rate.frame_period());

        let invoked = self.entries.len();
        self.entries
            .retain_mut(|e| (e.callback)(&ctx) == TickControl::Continue);

        FrameReport {
            frame_index: ctx.time.frame_index,
            spent: self.clock.now().saturating_sub(started),
            invoked,
            removed: invoked - self.entries.len(),
        }
    }

    /// Runs one frame, then sleeps out the rest of the frame period if pacing is on.
    pub fn run_frame(&mut self) -> FrameReport {
        let report = self.step();

        if self.config.sleep {
            let wait = self.config.rate.frame_period().saturating_sub(report.spent);
            if !wait.is_zero() {
                thread::sleep(wait);
            }
        } else if report.spent > self.config.rate.frame_period() {
            log::debug!(
                "frame {} overran its period: {:?} > {:?}",
                report.frame_index,
                report.spent,
                self.config.rate.frame_period()
            );
        }

        report
    }

    /// Drives frames until no callbacks remain. Returns the number of frames run.
    ///
    /// A callback that never returns `TickControl::Remove` keeps this running forever.
    pub fn run(&mut self) -> u64 {
        let mut frames = 0;
        while !self.is_empty() {
            self.run_frame();
            frames += 1;
        }
        frames
    }

    /// Drives at most `max_frames` frames. Returns `true` if the driver drained.
    pub fn run_frames(&mut self, max_frames: u64) -> bool {
        for _ in 0..max_frames {
            if self.is_empty() {
                break;
            }
            self.run_frame();
        }
        self.is_empty()
    }
}

impl<C: Clock + Clone> fmt::Debug for TickDriver<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickDriver")
            .field("config", &self.config)
            .field("callbacks", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn unpaced(clock: &ManualClock) -> TickDriver<ManualClock> {
        TickDriver::with_clock(clock.clone(), TickConfig { sleep: false, ..TickConfig::default() })
    }

    // ── registration ──────────────────────────────────────────────────────

    #[test]
    fn callbacks_run_in_registration_order() {
        let mut driver = unpaced(&ManualClock::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            driver.register(move |_| {
                log.borrow_mut().push(name);
                TickControl::Continue
            });
        }

        driver.step();
        driver.step();
        assert_eq!(*log.borrow(), ["a", "b", "c", "a", "b", "c"]);
    }

    #[test]
    fn deregister_removes_only_that_callback() {
        let mut driver = unpaced(&ManualClock::new());
        let a = driver.register(|_| TickControl::Continue);
        let b = driver.register(|_| TickControl::Continue);
        assert!(driver.deregister(a));
        assert!(!driver.deregister(a));
        assert!(driver.is_registered(b));
        assert_eq!(driver.len(), 1);
    }

    // ── stepping ──────────────────────────────────────────────────────────

    #[test]
    fn remove_takes_effect_after_frame() {
        let mut driver = unpaced(&ManualClock::new());
        let mut calls = 0;
        driver.register(move |_| {
            calls += 1;
            if calls == 2 { TickControl::Remove } else { TickControl::Continue }
        });
        driver.register(|_| TickControl::Continue);

        let first = driver.step();
        assert_eq!((first.invoked, first.removed), (2, 0));
        let second = driver.step();
        assert_eq!((second.invoked, second.removed), (2, 1));
        assert_eq!(driver.len(), 1);
    }

    #[test]
    fn ctx_carries_frame_index_and_period() {
        let mut driver = unpaced(&ManualClock::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        driver.register(move |ctx| {
            sink.borrow_mut().push((ctx.time.frame_index, ctx.period));
            TickControl::Continue
        });
        driver.step();
        driver.step();
        let period = Duration::from_micros(33_333);
        assert_eq!(*seen.borrow(), [(0, period), (1, period)]);
    }

    #[test]
    fn report_measures_time_spent_in_callbacks() {
        let clock = ManualClock::new();
        let mut driver = unpaced(&clock);
        let inner = clock.clone();
        driver.register(move |_| {
            inner.advance(Duration::from_millis(12));
            TickControl::Continue
        });
        assert_eq!(driver.step().spent, Duration::from_millis(12));
    }

    // ── running ───────────────────────────────────────────────────────────

    #[test]
    fn run_stops_when_drained() {
        let mut driver = unpaced(&ManualClock::new());
        let mut left = 3;
        driver.register(move |_| {
            left -= 1;
            if left == 0 { TickControl::Remove } else { TickControl::Continue }
        });
        assert_eq!(driver.run(), 3);
        assert!(driver.is_empty());
    }

    #[test]
    fn run_on_empty_driver_runs_no_frames() {
        let mut driver = unpaced(&ManualClock::new());
        assert_eq!(driver.run(), 0);
    }

    #[test]
    fn run_frames_is_bounded() {
        let mut driver = unpaced(&ManualClock::new());
        let frames = Rc::new(RefCell::new(0));
        let count = Rc::clone(&frames);
        driver.register(move |_| {
            *count.borrow_mut() += 1;
            TickControl::Continue
        });
        assert!(!driver.run_frames(5));
        assert_eq!(*frames.borrow(), 5);
    }

    #[test]
    fn paced_frame_sleeps_out_period() {
        let config = TickConfig { rate: FrameRate::new(100).unwrap(), sleep: true };
        let mut driver = TickDriver::new(config);
        driver.register(|_| TickControl::Remove);
        let started = std::time::Instant::now();
        driver.run();
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
