use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::processing::{BatchConfig, HashAlgorithm, DEFAULT_HASH_SIZE, MAX_HASH_SIZE};

/// Workers per concurrency unit. Hashing mixes file I/O with decoding, so the pool
/// is wider than the CPU count.
pub const WORKERS_PER_THREAD: usize = 2;

/// Files submitted to the pool per chunk
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Upper bound for the configured concurrency unit
pub const MAX_THREADS: usize = 1024;

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration for a duplicate search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Perceptual hash algorithm
    pub algorithm: HashAlgorithm,

    /// Fingerprint edge length; fingerprints hold hash_size^2 bits
    pub hash_size: u32,

    /// Maximum Hamming distance for a match (None = algorithm preset)
    pub threshold: Option<u32>,

    /// Whether to descend into subdirectories
    pub recursive: bool,

    /// Report every matching pair under both paths in single-directory searches
    pub full_match: bool,

    /// Concurrency unit for the worker pool (0 = number of CPUs)
    pub threads: usize,

    /// Number of files submitted to the worker pool at once
    pub batch_size: usize,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Phash,
            hash_size: DEFAULT_HASH_SIZE,
            threshold: None,
            recursive: false,
            full_match: false,
            threads: 0, // Auto
            batch_size: DEFAULT_BATCH_SIZE,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Configuration preset for `algorithm`
    pub fn for_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.hash_size == 0 || self.hash_size > MAX_HASH_SIZE {
            return Err(Error::Configuration(format!(
                "Hash size must be between 1 and {}, got {}",
                MAX_HASH_SIZE, self.hash_size
            )));
        }

        if self.algorithm == HashAlgorithm::Whash && !self.hash_size.is_power_of_two() {
            return Err(Error::Configuration(format!(
                "whash needs a power-of-two hash size, got {}",
                self.hash_size
            )));
        }

        if self.threads > MAX_THREADS {
            return Err(Error::Configuration(format!(
                "Threads must be at most {}, got {}",
                MAX_THREADS, self.threads
            )));
        }

        if self.batch_size == 0 {
            return Err(Error::Configuration(
                "Batch size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Threshold to match with: the configured one, or the algorithm preset
    pub fn effective_threshold(&self) -> u32 {
        self.threshold
            .unwrap_or_else(|| self.algorithm.default_threshold())
    }

    /// Concurrency unit, resolving 0 to the number of CPUs
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    /// Worker pool settings for the batch hasher
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            thread_limit: self.effective_threads().saturating_mul(WORKERS_PER_THREAD),
            batch_size: self.batch_size,
        }
    }
}
