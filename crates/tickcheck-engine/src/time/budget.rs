use std::time::Duration;

use super::clock::Clock;

/// Time allowance for work done within one frame.
///
/// The budget is checked, never enforced: callers ask whether it is exhausted
/// before starting the next unit of work, so a single unit can overrun it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameBudget {
    started: Duration,
    limit: Duration,
}

impl FrameBudget {
    /// Starts a budget of `limit` at the clock's current reading.
    pub fn start<C: Clock + ?Sized>(clock: &C, limit: Duration) -> Self {
        Self { started: clock.now(), limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        clock.now().saturating_sub(self.started)
    }

    pub fn remaining<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        self.limit.saturating_sub(self.elapsed(clock))
    }

    /// True once elapsed time has reached the limit.
    pub fn is_exhausted<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        self.elapsed(clock) >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    #[test]
    fn fresh_budget_is_not_exhausted() {
        let clock = ManualClock::new();
        let b = FrameBudget::start(&clock, Duration::from_millis(10));
        assert!(!b.is_exhausted(&clock));
        assert_eq!(b.remaining(&clock), Duration::from_millis(10));
    }

    #[test]
    fn exhausted_exactly_at_limit() {
        let clock = ManualClock::new();
        let b = FrameBudget::start(&clock, Duration::from_millis(10));
        clock.advance(Duration::from_millis(9));
        assert!(!b.is_exhausted(&clock));
        clock.advance(Duration::from_millis(1));
        assert!(b.is_exhausted(&clock));
    }

    #[test]
    fn remaining_saturates_after_overrun() {
        let clock = ManualClock::new();
        let b = FrameBudget::start(&clock, Duration::from_millis(10));
        clock.advance(Duration::from_millis(25));
        assert_eq!(b.remaining(&clock), Duration::ZERO);
        assert_eq!(b.elapsed(&clock), Duration::from_millis(25));
    }

    #[test]
    fn zero_limit_is_exhausted_immediately() {
        let clock = ManualClock::new();
        let b = FrameBudget::start(&clock, Duration::ZERO);
        assert!(b.is_exhausted(&clock));
    }
}
