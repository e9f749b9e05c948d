//! Timestamp sources for response lines.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Millisecond timestamp source.
pub trait Clock {
    /// Milliseconds since this clock's epoch.
    fn now_millis(&self) -> u64;
}

/// Wall clock: milliseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Milliseconds since the clock was created, for devices without an RTC.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// A settable clock for deterministic output.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: Cell<u64>,
}

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get().saturating_add(millis));
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Selects a clock by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockKind {
    /// [`SystemClock`].
    #[default]
    System,
    /// [`MonotonicClock`] started when the clock is built.
    Monotonic,
}

impl ClockKind {
    /// Build the selected clock.
    pub fn build(self) -> Box<dyn Clock> {
        match self {
            ClockKind::System => Box::new(SystemClock),
            ClockKind::Monotonic => Box::new(MonotonicClock::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn monotonic_clock_starts_near_zero() {
        let clock = MonotonicClock::new();
        assert!(clock.now_millis() < 60_000);
    }

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let clock = FixedClock::new(100);
        assert_eq!(clock.now_millis(), 100);
        clock.advance(5);
        assert_eq!(clock.now_millis(), 105);
        clock.set(7);
        assert_eq!(clock.now_millis(), 7);
    }

    #[test]
    fn kind_builds_matching_clock() {
        assert!(ClockKind::System.build().now_millis() > 1_577_836_800_000);
        assert!(ClockKind::Monotonic.build().now_millis() < 60_000);
    }
}
