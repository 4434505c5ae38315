use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Thread-safe throughput counters for a batch run.
///
/// Workers bump the counters with relaxed atomics; readers get a consistent
/// enough view for progress display. No cross-process state is kept.
pub struct Statistics {
    keys_tested: AtomicU64,
    items_solved: AtomicU64,
    started: Instant,
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            keys_tested: AtomicU64::new(0),
            items_solved: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn add_keys_tested(&self, n: u64) {
        self.keys_tested.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_solved(&self) {
        self.items_solved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn keys_tested(&self) -> u64 {
        self.keys_tested.load(Ordering::Relaxed)
    }

    pub fn items_solved(&self) -> u64 {
        self.items_solved.load(Ordering::Relaxed)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Candidate keys tested per second since construction.
    pub fn rate(&self) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed > 0.0 {
            self.keys_tested() as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}
