use anyhow::{Context, Result};

use tickcheck_engine::tick::{TickConfig, TickDriver};
use tickcheck_engine::time::{Clock, FrameRate, MonotonicClock};

use crate::registry::TestRegistry;
use crate::results::{Checker, TestResult};
use crate::scheduler::{Scheduler, SchedulerConfig};

/// Builder that wires a registry, a scheduler, and a tick driver together.
///
/// Register tests in the order they should run, then call [`run`] to drive a
/// tick loop until the scheduler reports and deregisters.
///
/// ```rust,no_run
/// use tickcheck::Harness;
///
/// let harness = Harness::new();
/// let check = harness.checker();
/// let result = harness
///     .single_frame("arith", move || check.check(1 + 1 == 2))
///     .run()
///     .unwrap();
/// assert_eq!(result.to_string(), "1 / 1");
/// ```
///
/// [`run`]: Harness::run
pub struct Harness<C: Clock + Clone + 'static = MonotonicClock> {
    clock: C,
    rate: FrameRate,
    paced: bool,
    registry: TestRegistry,
    checker: Checker,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone + 'static> Harness<C> {
    /// Uses `clock` for both frame pacing and the single-frame budget.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            rate: FrameRate::DEFAULT,
            paced: true,
            registry: TestRegistry::new(),
            checker: Checker::new(),
        }
    }

    /// Frame rate of the tick loop and of the single-frame budget.
    pub fn rate(mut self, rate: FrameRate) -> Self {
        self.rate = rate;
        self
    }

    /// Whether the tick loop sleeps out each frame. On by default.
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Handle for recording checks; capture a clone in each test body.
    pub fn checker(&self) -> Checker {
        self.checker.clone()
    }

    pub fn single_frame<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.registry.register_single_frame(name, action);
        self
    }

    pub fn multi_frame<F>(mut self, name: impl Into<String>, poll: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        self.registry.register_multi_frame(name, poll);
        self
    }

    /// Hands the registered tests to a scheduler without running it.
    pub fn into_scheduler(self) -> Scheduler<C> {
        Scheduler::from_parts(
            self.clock,
            SchedulerConfig { rate: self.rate },
            self.registry,
            self.checker,
        )
    }

    /// Drives a tick loop until the run reports. Returns the final counters.
    ///
    /// Does not return while a multi-frame test keeps answering `false`.
    pub fn run(self) -> Result<TestResult> {
        let config = TickConfig {
            rate: self.rate,
            sleep: self.paced,
        };
        let mut driver = TickDriver::with_clock(self.clock.clone(), config);
        let scheduler = self.into_scheduler();

        scheduler
            .start(&mut driver)
            .context("failed to start the test scheduler")?;

        let frames = driver.run();
        log::debug!("tick loop drained after {frames} frame(s) at {}", config.rate);

        scheduler
            .last_result()
            .context("tick loop drained before the scheduler reported")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use tickcheck_engine::time::ManualClock;

    fn harness() -> Harness<ManualClock> {
        Harness::with_clock(ManualClock::new()).paced(false)
    }

    #[test]
    fn run_reports_aggregate_counts() {
        let h = harness();
        let (a, b) = (h.checker(), h.checker());
        let mut polls = 0;
        let result = h
            .single_frame("test1", move || {
                a.check(1 == 1);
                a.check(1 == 0);
            })
            .multi_frame("test2", move || {
                polls += 1;
                b.check(true);
                polls >= 3
            })
            .run()
            .unwrap();

        assert_eq!(result.to_string(), "4 / 5");
    }

    #[test]
    fn run_with_no_tests_is_empty_pass() {
        let result = harness().run().unwrap();
        assert_eq!(result, TestResult::default());
        assert!(result.passed());
    }

    #[test]
    fn rate_sets_single_frame_budget() {
        let clock = ManualClock::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut h = Harness::with_clock(clock.clone())
            .paced(false)
            .rate(FrameRate::new(100).unwrap());

        // 6ms per test against a 10ms budget: two tests per frame.
        for name in ["a", "b", "c", "d"] {
            let (order, clock) = (Rc::clone(&order), clock.clone());
            h = h.single_frame(name, move || {
                order.borrow_mut().push(name);
                clock.advance(Duration::from_millis(6));
            });
        }

        let scheduler = h.into_scheduler();
        let mut driver = TickDriver::with_clock(
            clock.clone(),
            TickConfig { rate: FrameRate::new(100).unwrap(), sleep: false },
        );
        scheduler.start(&mut driver).unwrap();
        driver.step();
        assert_eq!(scheduler.single_frame_progress(), 2);
        driver.run();
        assert_eq!(*order.borrow(), ["a", "b", "c", "d"]);
    }
}
