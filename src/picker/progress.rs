//! Progress reporting for in-flight transfers.
//!
//! The fetch side owns a [`ProgressReporter`]; everyone else gets a
//! read-only [`Progress`] that can be cloned freely and polled from the
//! UI thread while the transfer runs on a worker.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    completed: AtomicU64,
    total: AtomicU64,
    finished: AtomicBool,
}

/// Read-only view of a transfer's progress
#[derive(Debug, Clone)]
pub struct Progress {
    inner: Arc<Counters>,
}

/// Write side of a [`Progress`], held by the transfer itself
#[derive(Debug)]
pub struct ProgressReporter {
    inner: Arc<Counters>,
}

impl Progress {
    /// Create a linked progress handle / reporter pair
    pub fn new() -> (Progress, ProgressReporter) {
        let inner = Arc::new(Counters::default());
        (
            Progress { inner: inner.clone() },
            ProgressReporter { inner },
        )
    }

    /// Units (bytes) processed so far
    pub fn completed(&self) -> u64 {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Total units expected, 0 while unknown
    pub fn total(&self) -> u64 {
        self.inner.total.load(Ordering::Acquire)
    }

    /// Fraction in `0.0..=1.0`, or `None` while the total is unknown
    pub fn fraction(&self) -> Option<f32> {
        if self.is_finished() {
            return Some(1.0);
        }

        let total = self.total();
        if total == 0 {
            return None;
        }

        Some((self.completed() as f64 / total as f64).clamp(0.0, 1.0) as f32)
    }

    pub fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::Acquire)
    }
}

/// Two handles are equal when they observe the same transfer
impl PartialEq for Progress {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ProgressReporter {
    pub fn set_total(&self, total: u64) {
        self.inner.total.store(total, Ordering::Release);
    }

    pub fn advance(&self, units: u64) {
        self.inner.completed.fetch_add(units, Ordering::AcqRel);
    }

    /// Mark the transfer done, whatever its outcome
    pub fn finish(&self) {
        self.inner.finished.store(true, Ordering::Release);
    }
}
