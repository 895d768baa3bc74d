//! Time adapters.
//!
//! - [`SystemClock`] reads the `embassy-time` driver (the std driver on
//!   hosts, the hardware timer on targets that provide one).
//! - [`ManualClock`] only moves when told to, for replaying recorded
//!   sensor streams and for tests.

use core::cell::Cell;
use std::rc::Rc;

use embassy_time::{Duration, Instant};

use crate::app::ports::Clock;

/// Monotonic clock backed by the `embassy-time` driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock.  Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ms: Rc<Cell<u64>>,
}

impl ManualClock {
    /// A clock standing at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.ms.set(self.ms.get() + by.as_millis());
    }

    /// Jump to `at`.  Moving backwards is ignored.
    pub fn set(&self, at: Instant) {
        self.ms.set(self.ms.get().max(at.as_millis()));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.ms.get())
    }
}
