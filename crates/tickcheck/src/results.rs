use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Aggregate check counters for one run.
///
/// `success <= total` always holds; both only grow during a run.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TestResult {
    pub success: u32,
    pub total: u32,
}

impl TestResult {
    pub fn failed(&self) -> u32 {
        self.total.saturating_sub(self.success)
    }

    /// True when every recorded check succeeded (vacuously true with no checks).
    pub fn passed(&self) -> bool {
        self.success == self.total
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.success, self.total)
    }
}

/// A failed check, attributed to the test that was running when it was recorded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CheckFailure {
    /// `None` when the check was recorded outside any scheduled test.
    pub test: Option<String>,
    pub message: Option<String>,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let test = self.test.as_deref().unwrap_or("<no test>");
        match &self.message {
            Some(msg) => write!(f, "{test}: {msg}"),
            None => write!(f, "{test}: check failed"),
        }
    }
}

#[derive(Debug, Default)]
struct Ledger {
    result: TestResult,
    current: Option<String>,
    failures: Vec<CheckFailure>,
}

/// Handle through which test bodies record check outcomes.
///
/// Clones share one ledger. Test closures capture a clone; the scheduler owns
/// another and resets it at the start of each run.
#[derive(Debug, Clone, Default)]
pub struct Checker(Rc<RefCell<Ledger>>);

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one check: `total` always increments, `success` iff `condition`.
    pub fn check(&self, condition: bool) {
        self.record(condition, None);
    }

    /// Like [`check`](Self::check), keeping `message` if the check fails.
    pub fn check_msg(&self, condition: bool, message: impl Into<String>) {
        let message = if condition { None } else { Some(message.into()) };
        self.record(condition, message);
    }

    /// Snapshot of the counters.
    pub fn result(&self) -> TestResult {
        self.0.borrow().result
    }

    /// Failed checks recorded so far, in order.
    pub fn failures(&self) -> Vec<CheckFailure> {
        self.0.borrow().failures.clone()
    }

    /// Name of the test currently being executed by the scheduler, if any.
    pub fn current_test(&self) -> Option<String> {
        self.0.borrow().current.clone()
    }

    pub(crate) fn reset(&self) {
        *self.0.borrow_mut() = Ledger::default();
    }

    pub(crate) fn enter(&self, test: &str) {
        self.0.borrow_mut().current = Some(test.to_string());
    }

    pub(crate) fn leave(&self) {
        self.0.borrow_mut().current = None;
    }

    fn record(&self, condition: bool, message: Option<String>) {
        let mut ledger = self.0.borrow_mut();
        ledger.result.total = ledger.result.total.saturating_add(1);
        if condition {
            ledger.result.success = ledger.result.success.saturating_add(1);
            return;
        }

        let test = ledger.current.clone();
        ledger.failures.push(CheckFailure { test, message });
    }
}
