use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tickcheck_engine::tick::{TickControl, TickCtx, TickDriver, TickId};
use tickcheck_engine::time::{Clock, FrameBudget, FrameRate, MonotonicClock};

use crate::registry::{RegistryError, TestRegistry};
use crate::results::{CheckFailure, Checker, TestResult};

/// Scheduler phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum State {
    Off,
    RunningSingleFrame,
    RunningMultiFrame,
    Done,
}

/// Scheduler configuration.
#[derive(Debug, Copy, Clone, Default)]
pub struct SchedulerConfig {
    /// Per-frame time budget for single-frame tests is one period of this rate.
    pub rate: FrameRate,
}

/// `start()` refused.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SchedulerError {
    AlreadyRunning,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::AlreadyRunning => write!(f, "the test is already running"),
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Run status kept outside the core's `RefCell`.
///
/// Readable at any time, including from a test body while the core is
/// mutably borrowed by `tick()`.
#[derive(Debug)]
struct Status {
    state: Cell<State>,
    /// A tick handler for the current run is registered with a driver.
    active: Cell<bool>,
    last_result: Cell<Option<TestResult>>,
    single_frame_attempted: Cell<usize>,
    multi_frame_completed: Cell<usize>,
    registered: Cell<(usize, usize)>,
}

impl Status {
    fn new() -> Self {
        Self {
            state: Cell::new(State::Off),
            active: Cell::new(false),
            last_result: Cell::new(None),
            single_frame_attempted: Cell::new(0),
            multi_frame_completed: Cell::new(0),
            registered: Cell::new((0, 0)),
        }
    }
}

struct Core<C> {
    config: SchedulerConfig,
    clock: C,
    registry: TestRegistry,
    status: Rc<Status>,
    /// Index of the last single-frame test attempted; `None` before the first.
    cursor: Option<usize>,
    /// One flag per multi-frame test, set once its poll returns `true`.
    completed: Vec<bool>,
}

impl<C: Clock> Core<C> {
    fn reset(&mut self, checker: &Checker) {
        checker.reset();
        self.status.state.set(State::Off);
        self.status.single_frame_attempted.set(0);
        self.status.multi_frame_completed.set(0);
        self.cursor = None;
        self.completed.clear();
        self.completed.resize(self.registry.multi_frame_len(), false);
    }

    fn tick(&mut self, ctx: &TickCtx, checker: &Checker) -> TickControl {
        match self.status.state.get() {
            State::RunningSingleFrame => {
                self.run_single_frame(ctx, checker);
                TickControl::Continue
            }
            State::RunningMultiFrame => {
                self.poll_multi_frame(ctx, checker);
                TickControl::Continue
            }
            State::Done => {
                self.report(checker);
                TickControl::Remove
            }
            State::Off => TickControl::Remove,
        }
    }

    /// Runs single-frame tests until the frame budget is spent.
    ///
    /// The budget is checked before each test, so the last test started may
    /// overrun it; nothing preempts a running test.
    fn run_single_frame(&mut self, ctx: &TickCtx, checker: &Checker) {
        let budget = FrameBudget::start(&self.clock, self.config.rate.frame_period());
        let mut ran = 0usize;

        while !budget.is_exhausted(&self.clock) {
            let index = self.cursor.map_or(0, |c| c + 1);
            self.cursor = Some(index);

            let Some(test) = self.registry.single_frame_mut(index) else {
                log::debug!(
                    "frame {}: single-frame tests exhausted, moving to multi-frame tests",
                    ctx.time.frame_index
                );
                self.status.state.set(State::RunningMultiFrame);
                return;
            };

            self.status.single_frame_attempted.set(index + 1);
            checker.enter(test.name());
            test.run();
            checker.leave();
            ran += 1;
        }

        let spent = budget.elapsed(&self.clock);
        log::debug!(
            "frame {}: {ran} single-frame test(s) took {spent:?} of {:?}, deferring the rest",
            ctx.time.frame_index,
            budget.limit()
        );
        if spent > ctx.period {
            log::debug!(
                "frame {}: single-frame tests overran the host frame period ({spent:?} > {:?})",
                ctx.time.frame_index,
                ctx.period
            );
        }
    }

    /// Polls every unfinished multi-frame test once.
    fn poll_multi_frame(&mut self, ctx: &TickCtx, checker: &Checker) {
        let mut polled = 0usize;

        for (test, done) in self
            .registry
            .multi_frame_mut()
            .iter_mut()
            .zip(self.completed.iter_mut())
        {
            if *done {
                continue;
            }
            polled += 1;

            checker.enter(test.name());
            *done = test.poll();
            checker.leave();

            if *done {
                log::debug!("multi-frame test finished: {}", test.name());
            }
        }

        self.status
            .multi_frame_completed
            .set(self.completed.iter().filter(|d| **d).count());

        if polled == 0 {
            log::debug!("frame {}: all multi-frame tests finished", ctx.time.frame_index);
            self.status.state.set(State::Done);
        }
    }

    fn report(&mut self, checker: &Checker) {
        let result = checker.result();
        log::info!("test completed. result: {result}");
        for failure in checker.failures() {
            log::warn!("failed check in {failure}");
        }

        self.status.last_result.set(Some(result));
        self.status.active.set(false);
    }
}

/// Tick handler registered by `start()`.
///
/// However the driver lets go of it (self-removal after the report, an
/// explicit deregister, or the driver being dropped), the scheduler becomes
/// startable again.
struct Handler<C: Clock + 'static> {
    scheduler: Scheduler<C>,
}

impl<C: Clock + 'static> Handler<C> {
    fn tick(&self, ctx: &TickCtx) -> TickControl {
        self.scheduler.tick(ctx)
    }
}

impl<C: Clock + 'static> Drop for Handler<C> {
    fn drop(&mut self) {
        self.scheduler.detach();
    }
}

/// Frame-budgeted test scheduler.
///
/// A cheap handle: clones share the same registry and run state. [`start`]
/// registers a tick handler with a [`TickDriver`]; the handler drains
/// single-frame tests within each frame's budget, polls multi-frame tests
/// once per frame until all report done, then logs the summary and
/// deregisters itself. [`stop`] abandons a run early.
///
/// [`start`]: Scheduler::start
/// [`stop`]: Scheduler::stop
pub struct Scheduler<C: Clock = MonotonicClock> {
    core: Rc<RefCell<Core<C>>>,
    status: Rc<Status>,
    checker: Checker,
}

impl Scheduler {
    /// Wall-clock scheduler with the default 30 fps budget.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new(), SchedulerConfig::default())
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Clone for Scheduler<C> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            status: Rc::clone(&self.status),
            checker: self.checker.clone(),
        }
    }
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn with_clock(clock: C, config: SchedulerConfig) -> Self {
        Self::from_parts(clock, config, TestRegistry::new(), Checker::new())
    }

    pub(crate) fn from_parts(
        clock: C,
        config: SchedulerConfig,
        registry: TestRegistry,
        checker: Checker,
    ) -> Self {
        let status = Rc::new(Status::new());
        status
            .registered
            .set((registry.single_frame_len(), registry.multi_frame_len()));

        Self {
            core: Rc::new(RefCell::new(Core {
                config,
                clock,
                registry,
                status: Rc::clone(&status),
                cursor: None,
                completed: Vec::new(),
            })),
            status,
            checker,
        }
    }

    /// Handle for recording checks; capture a clone in each test body.
    pub fn checker(&self) -> Checker {
        self.checker.clone()
    }

    /// Records one check outcome against the current run.
    pub fn check(&self, condition: bool) {
        self.checker.check(condition);
    }

    pub fn register_single_frame<F>(&self, name: impl Into<String>, action: F) -> Result<(), RegistryError>
    where
        F: FnMut() + 'static,
    {
        let name = name.into();
        let mut core = self.lock_registry(&name)?;
        core.registry.register_single_frame(name, action);
        self.sync_registered(&core.registry);
        Ok(())
    }

    pub fn register_multi_frame<F>(&self, name: impl Into<String>, poll: F) -> Result<(), RegistryError>
    where
        F: FnMut() -> bool + 'static,
    {
        let name = name.into();
        let mut core = self.lock_registry(&name)?;
        core.registry.register_multi_frame(name, poll);
        self.sync_registered(&core.registry);
        Ok(())
    }

    fn lock_registry(&self, name: &str) -> Result<std::cell::RefMut<'_, Core<C>>, RegistryError> {
        let locked = || {
            log::warn!("test registration refused, a run is in progress: {name}");
            RegistryError::Locked { name: name.to_string() }
        };

        if self.status.active.get() {
            return Err(locked());
        }
        self.core.try_borrow_mut().map_err(|_| locked())
    }

    fn sync_registered(&self, registry: &TestRegistry) {
        self.status
            .registered
            .set((registry.single_frame_len(), registry.multi_frame_len()));
    }

    /// Begins a run and registers the tick handler with `driver`.
    ///
    /// Refused while a previous run's handler is still registered; that run
    /// continues unaffected and its counters are left untouched.
    pub fn start<D: Clock + Clone>(&self, driver: &mut TickDriver<D>) -> Result<TickId, SchedulerError> {
        let rejected = || {
            log::warn!("auto test start failed, the test is already running");
            SchedulerError::AlreadyRunning
        };

        if self.status.active.get() {
            return Err(rejected());
        }
        self.core
            .try_borrow_mut()
            .map_err(|_| rejected())?
            .reset(&self.checker);

        self.status.state.set(State::RunningSingleFrame);
        self.status.active.set(true);

        let handler = Handler { scheduler: self.clone() };
        let id = driver.register(move |ctx| handler.tick(ctx));
        log::info!("auto test started");
        Ok(id)
    }

    /// Abandons the run whose handler `start()` registered as `id`.
    ///
    /// Returns `false` if `id` is no longer registered with `driver` (for
    /// example because the run already reported).
    pub fn stop<D: Clock + Clone>(&self, driver: &mut TickDriver<D>, id: TickId) -> bool {
        let removed = driver.deregister(id);
        if removed {
            log::info!("auto test stopped");
        }
        removed
    }

    /// Advances the state machine by one frame of work.
    ///
    /// Normally called by the tick handler that [`start`](Self::start) registers.
    pub fn tick(&self, ctx: &TickCtx) -> TickControl {
        match self.core.try_borrow_mut() {
            Ok(mut core) => core.tick(ctx, &self.checker),
            Err(_) => {
                log::error!("scheduler ticked re-entrantly from inside a test; ignoring");
                TickControl::Continue
            }
        }
    }

    /// Marks the run's handler as gone. A run that had not reported goes back to `Off`.
    fn detach(&self) {
        if !self.status.active.replace(false) {
            return;
        }
        if self.status.state.get() != State::Done {
            log::warn!("auto test handler dropped before the run reported");
            self.status.state.set(State::Off);
        }
    }

    pub fn state(&self) -> State {
        self.status.state.get()
    }

    /// True when a new run may be started.
    pub fn is_idle(&self) -> bool {
        !self.status.active.get()
    }

    /// Live counters of the current (or most recent) run.
    pub fn result(&self) -> TestResult {
        self.checker.result()
    }

    /// Counters reported by the most recently completed run.
    pub fn last_result(&self) -> Option<TestResult> {
        self.status.last_result.get()
    }

    pub fn failures(&self) -> Vec<CheckFailure> {
        self.checker.failures()
    }

    /// Number of single-frame tests attempted so far in the current run.
    pub fn single_frame_progress(&self) -> usize {
        self.status.single_frame_attempted.get()
    }

    /// Number of multi-frame tests that have reported done in the current run.
    pub fn multi_frame_completed(&self) -> usize {
        self.status.multi_frame_completed.get()
    }

    /// `(single-frame, multi-frame)` test counts.
    pub fn registry_len(&self) -> (usize, usize) {
        self.status.registered.get()
    }
}

impl<C: Clock> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.status.state.get())
            .field("active", &self.status.active.get())
            .field("registered", &self.status.registered.get())
            .field("result", &self.checker.result())
            .finish()
    }
}
