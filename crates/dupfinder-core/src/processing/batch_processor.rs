//! This module fingerprints every image under a directory on a bounded worker pool.
//!
//! # Structures
//! - `BatchConfig`: Thread limit and chunk size for the worker pool.
//!
//! # Functions
//! - `process_image_batch`: Fingerprints one chunk of paths in parallel and returns the
//!   successful results along with the error count.
//! - `process_images_in_batches`: Feeds a file list to the pool chunk by chunk, waiting for
//!   each chunk to finish before submitting the next, so peak memory and open file
//!   handles stay bounded for directories with tens of thousands of files.
//! - `compute_fingerprint_set`: Discovers the images under a directory and assembles
//!   their fingerprints into a `FingerprintSet`. The `_on` variant reuses a pool
//!   across directories.
//!
//! Files that fail to decode are logged by the fingerprint engine and dropped here.
//! They are never retried.

use log::{debug, info};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use super::perceptual::compute_fingerprint;
use super::progress::HashProgress;
use super::types::{Fingerprint, HashAlgorithm};
use crate::config::{DEFAULT_BATCH_SIZE, WORKERS_PER_THREAD};
use crate::discovery::discover_images;
use crate::error::{Error, Result};
use crate::types::FingerprintSet;

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of threads to use
    pub thread_limit: usize,
    /// Maximum number of images per batch
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            thread_limit: num_cpus::get().saturating_mul(WORKERS_PER_THREAD),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl BatchConfig {
    /// Build the worker pool described by this configuration
    pub fn build_pool(&self) -> Result<ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.thread_limit.max(1))
            .thread_name(|i| format!("dupfinder-hash-{}", i))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build thread pool: {}", e)))
    }
}

/// Fingerprint a batch of images on `pool`.
/// Returns a tuple of (successful results, error count)
pub fn process_image_batch(
    pool: &ThreadPool,
    paths: &[PathBuf],
    algorithm: HashAlgorithm,
    hash_size: u32,
    progress: Option<&HashProgress>,
) -> (Vec<(PathBuf, Fingerprint)>, usize) {
    let error_counter = AtomicUsize::new(0);

    let results: Vec<_> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let outcome = compute_fingerprint(path, algorithm, hash_size);

                if let Some(progress) = progress {
                    progress.record_processed();
                }

                outcome
            })
            .filter_map(|(path, result)| match result {
                Ok(fingerprint) => Some((path, fingerprint)),
                Err(_) => {
                    error_counter.fetch_add(1, Ordering::Relaxed);
                    None
                }
            })
            .collect()
    });

    (results, error_counter.load(Ordering::Relaxed))
}

/// Fingerprint images on `pool` in sequential chunks for bounded memory usage
pub fn process_images_in_batches(
    pool: &ThreadPool,
    images: &[PathBuf],
    algorithm: HashAlgorithm,
    hash_size: u32,
    batch_size: usize,
    progress: Option<&HashProgress>,
) -> FingerprintSet {
    let batch_size = batch_size.max(1);
    let total_batches = images.len().div_ceil(batch_size);
    let start = Instant::now();

    info!(
        "Hashing {} images with {} ({}x{}) on {} threads",
        images.len(),
        algorithm,
        hash_size,
        hash_size,
        pool.current_num_threads()
    );

    let mut fingerprints = FingerprintSet::with_capacity(images.len());
    let mut total_errors = 0;

    for (i, chunk) in images.chunks(batch_size).enumerate() {
        let (batch_results, errors) =
            process_image_batch(pool, chunk, algorithm, hash_size, progress);

        total_errors += errors;
        fingerprints.extend(batch_results);

        debug!(
            "Processed batch {}/{} ({} images, {} errors)",
            i + 1,
            total_batches,
            chunk.len(),
            errors
        );
    }

    info!(
        "Hashing complete: {} successful, {} errors in {:.2?}",
        fingerprints.len(),
        total_errors,
        start.elapsed()
    );

    fingerprints
}

/// Fingerprint every image under `root` with the default worker pool.
///
/// Only `.jpg`, `.jpeg` and `.png` files are considered, direct children only unless
/// `recursive` is set. A missing root is an error; unreadable images are skipped.
pub fn compute_fingerprint_set(
    root: &Path,
    algorithm: HashAlgorithm,
    hash_size: u32,
    recursive: bool,
) -> Result<FingerprintSet> {
    compute_fingerprint_set_with(
        root,
        algorithm,
        hash_size,
        recursive,
        &BatchConfig::default(),
        None,
    )
}

/// [`compute_fingerprint_set`] with an explicit pool configuration and progress tracking.
///
/// Builds a pool for this one call. Callers hashing several directories should build
/// the pool once and use [`compute_fingerprint_set_on`].
pub fn compute_fingerprint_set_with(
    root: &Path,
    algorithm: HashAlgorithm,
    hash_size: u32,
    recursive: bool,
    config: &BatchConfig,
    progress: Option<&HashProgress>,
) -> Result<FingerprintSet> {
    let pool = config.build_pool()?;
    compute_fingerprint_set_on(
        &pool,
        root,
        algorithm,
        hash_size,
        recursive,
        config.batch_size,
        progress,
    )
}

/// Fingerprint every image under `root` on an existing pool.
///
/// `progress` learns how many images were discovered, then counts every processed
/// file whether it succeeded or not.
pub fn compute_fingerprint_set_on(
    pool: &ThreadPool,
    root: &Path,
    algorithm: HashAlgorithm,
    hash_size: u32,
    recursive: bool,
    batch_size: usize,
    progress: Option<&HashProgress>,
) -> Result<FingerprintSet> {
    let images = discover_images(root, recursive)?;
    info!("Found {} images in {}", images.len(), root.display());

    if let Some(progress) = progress {
        progress.record_discovered(images.len());
    }

    Ok(process_images_in_batches(
        pool, &images, algorithm, hash_size, batch_size, progress,
    ))
}
