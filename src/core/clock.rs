//! Wall-clock sources.
//!
//! Bars measure elapsed time in fractional seconds. The scheduler owns one
//! clock and hands it to every bar on each update, so tests can swap in a
//! [`ManualClock`] and step time deterministically.

use std::cell::Cell;
use std::rc::Rc;

/// Source of "now" in fractional seconds since an arbitrary epoch
pub trait Clock {
    fn now(&self) -> f64;
}

/// Real wall clock (Unix time, microsecond resolution)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        use chrono::Utc;
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Hand-driven clock. Clones share the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
