use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared hashing progress, updated by worker threads and read by a UI thread
#[derive(Debug, Default)]
pub struct HashProgress {
    /// Images found by discovery, summed over every hashed directory
    discovered: AtomicUsize,
    /// Images handed back by the fingerprint engine, successful or not
    processed: AtomicUsize,
}

impl HashProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_discovered(&self, count: usize) {
        self.discovered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn discovered(&self) -> usize {
        self.discovered.load(Ordering::Relaxed)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }
}
