//! Wall-clock elapsed tracking for an active recording
//!
//! Elapsed time is always `now - started_at`, never a count of timer
//! callbacks, so a throttled or late timer cannot make a recording run long.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Monotonic system clock
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// Start/stop window over a clock
#[derive(Debug, Default)]
pub struct ElapsedTracker {
    started_at: Option<Duration>,
}

impl ElapsedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Duration) {
        self.started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Seconds since `start`, or `None` when stopped
    pub fn elapsed(&self, now: Duration) -> Option<f64> {
        self.started_at
            .map(|start| now.saturating_sub(start).as_secs_f64())
    }
}
