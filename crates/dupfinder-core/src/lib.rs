//! Core functionality for finding visually similar images.
//!
//! This library provides the building blocks of a duplicate search:
//! - Image discovery under a directory
//! - Perceptual fingerprints (phash, dhash, whash) computed on a bounded worker pool
//! - Near-duplicate matching within one fingerprint set or across two
//! - Flattened reports for display

// -- External Dependencies --
use log::info;
use rayon::ThreadPool;
use std::path::Path;
use std::time::Instant;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::{Config, LogLevel};
pub use deduplication::{find_duplicates, find_duplicates_across, similarity};
pub use error::{Error, Result};
pub use processing::{
    compute_fingerprint, compute_fingerprint_set, compute_fingerprint_set_on,
    compute_fingerprint_set_with, BatchConfig, Fingerprint, HashAlgorithm, HashProgress,
};
pub use report::{DuplicateReport, ImageDetails, ReportRow};
pub use types::*;

// -- Public Modules --
pub mod config;
pub mod deduplication;
pub mod discovery;
pub mod logging;
pub mod processing;
pub mod report;
pub mod types;

// -- Test Modules --
#[cfg(test)]
pub mod test_utils;

/// Main entry point for a duplicate search.
///
/// One worker pool is built up front and used for hashing and matching alike.
pub struct DuplicateFinder {
    config: Config,
    pool: ThreadPool,
}

impl DuplicateFinder {
    /// Create a new DuplicateFinder with the provided configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let pool = config.batch_config().build_pool()?;

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of worker threads shared by every search of this finder
    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Fingerprint every image under `directory`
    pub fn fingerprint_set(
        &self,
        directory: &Path,
        progress: Option<&HashProgress>,
    ) -> Result<FingerprintSet> {
        compute_fingerprint_set_on(
            &self.pool,
            directory,
            self.config.algorithm,
            self.config.hash_size,
            self.config.recursive,
            self.config.batch_size,
            progress,
        )
    }

    /// Find near-duplicates among the images of one directory
    pub fn scan(&self, directory: &Path, progress: Option<&HashProgress>) -> Result<MatchResult> {
        let start = Instant::now();
        let threshold = self.config.effective_threshold();
        info!(
            "Scanning {} with {} (threshold {})",
            directory.display(),
            self.config.algorithm,
            threshold
        );

        let fingerprints = self.fingerprint_set(directory, progress)?;
        let full_match = self.config.full_match;
        let matches = self
            .pool
            .install(|| find_duplicates(&fingerprints, threshold, full_match));

        info!(
            "Scan complete: {} of {} images have duplicates in {:.2?}",
            matches.len(),
            fingerprints.len(),
            start.elapsed()
        );
        Ok(matches)
    }

    /// Find images of `target` that resemble images of `source`.
    /// Result keys come from `source`.
    pub fn compare(
        &self,
        source: &Path,
        target: &Path,
        progress: Option<&HashProgress>,
    ) -> Result<MatchResult> {
        let start = Instant::now();
        let threshold = self.config.effective_threshold();
        info!(
            "Comparing {} against {} with {} (threshold {})",
            source.display(),
            target.display(),
            self.config.algorithm,
            threshold
        );

        let base = self.fingerprint_set(source, progress)?;
        let compare = self.fingerprint_set(target, progress)?;
        let matches = self
            .pool
            .install(|| find_duplicates_across(&base, &compare, threshold));

        info!(
            "Compare complete: {} of {} source images found in target in {:.2?}",
            matches.len(),
            base.len(),
            start.elapsed()
        );
        Ok(matches)
    }
}
