//! Time source for event conditions.
//!
//! Conditions see elapsed time since their handler was registered, so
//! only differences between `now()` readings matter. A manual clock only
//! moves when the host advances it, which makes timer-driven scripts
//! deterministic under test.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Virtual time, advanced explicitly. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// A clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        *self.now.lock()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }

    /// Negative and NaN amounts are ignored; amounts too large for a
    /// `Duration` saturate.
    pub fn advance_secs_f64(&self, secs: f64) {
        if secs > 0.0 {
            self.advance(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX));
        }
    }

    /// Jump to an absolute time. Moving backwards is ignored.
    pub fn set(&self, to: Duration) {
        let mut now = self.now.lock();
        if to > *now {
            *now = to;
        }
    }
}

/// The engine's clock.
#[derive(Clone, Debug)]
pub enum Clock {
    /// Monotonic wall time since the clock was created.
    System(Instant),
    Manual(ManualClock),
}

impl Clock {
    pub fn system() -> Self {
        Clock::System(Instant::now())
    }

    pub fn manual(handle: &ManualClock) -> Self {
        Clock::Manual(handle.clone())
    }

    /// Time since the clock's epoch.
    pub fn now(&self) -> Duration {
        match self {
            Clock::System(epoch) => epoch.elapsed(),
            Clock::Manual(clock) => clock.now(),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::system()
    }
}
