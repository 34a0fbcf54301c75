//! A scripted random source for tests and replays.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ports::RandomSource;

/// Returns the given values in turn, cycling; each value is clamped into
/// the requested range.
#[derive(Debug)]
pub struct SequenceRandomSource {
    values: Vec<f64>,
    next: AtomicUsize,
}

impl SequenceRandomSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            next: AtomicUsize::new(0),
        }
    }

    /// Always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandomSource {
    fn next_float(&self, min: f64, max: f64) -> f64 {
        if self.values.is_empty() || !(min < max) {
            return min;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[index].clamp(min, max)
    }
}
