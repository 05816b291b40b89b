//! Bounded FIFO of recent metric values for charting.

use std::collections::VecDeque;

/// Default ring capacity; fixed for the lifetime of the process.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// Fixed-capacity ring: once full, inserting drops the oldest entry.
/// Length never exceeds the configured capacity.
#[derive(Debug, Clone)]
pub struct MetricRing {
    buf: VecDeque<f32>,
    capacity: usize,
}

impl MetricRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Value copy, oldest first. Snapshot readers never alias the ring.
    pub fn to_vec(&self) -> Vec<f32> {
        self.buf.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for MetricRing {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
