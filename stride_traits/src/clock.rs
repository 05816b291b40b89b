use std::thread;
use std::time::{Duration, Instant};

/// Time source behind acquisition pacing and stall accounting.
///
/// Sample timestamps (`t_ns`) live in the producing sensor's clock domain
/// and never pass through this trait; it only answers how long the host
/// side has been running or waiting.
pub trait Clock {
    /// Current instant; must never go backwards.
    fn now(&self) -> Instant;

    /// Block (or simulate blocking) for `d`.
    fn sleep(&self, d: Duration);

    /// Whole milliseconds between `epoch` and now; 0 when `epoch` has not
    /// been reached yet.
    fn ms_since(&self, epoch: Instant) -> u64 {
        self.now().saturating_duration_since(epoch).as_millis() as u64
    }
}

/// `Clock` backed by `std::time::Instant` and a real `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}
