//! Monotonic time sources for the clock-driven entry point.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time points.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The system monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same underlying time, so a host can keep one handle and
/// hand another to a scheduler.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let origin = Instant::now();
        ManualClock {
            origin,
            now: Rc::new(Cell::new(origin)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Instant) {
        self.now.set(to);
    }

    /// Time advanced since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.now.get().saturating_duration_since(self.origin)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
