//! # Fingerprint Engine
//!
//! Turns one image file into a perceptual [`Fingerprint`].
//!
//! Perceptual hashing generates "fingerprints" that remain similar for visually similar
//! images, unlike cryptographic hashes where minor changes produce completely different
//! outputs. Three algorithms are available, see [`HashAlgorithm`]:
//!
//! 1. pHash: DCT of a (4n)x(4n) thumbnail, low frequencies against their median
//! 2. dHash: brightness gradient between horizontally adjacent pixels
//! 3. wHash: Haar wavelet approximation against its median
//!
//! ## Hamming Distance Interpretation
//!
//! For the default 8x8 (64-bit) fingerprints:
//!
//! - 0-3: Nearly identical images (same image with minor modifications)
//! - 4-12: Similar images (resized, recompressed, lightly edited)
//! - >12: Different images
//!
//! ## Failure isolation
//!
//! [`compute_fingerprint`] never returns early with an error. Every failure is logged
//! and handed back next to the path it belongs to, so a batch of thousands of files
//! survives any number of unreadable ones. Panics raised by decoders are caught and
//! turned into [`Error::HashPanic`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use super::core::calculate_fingerprint;
use super::types::{Fingerprint, HashAlgorithm};
use crate::error::{Error, Result};
use crate::logging::log_hash_error;

/// Outcome of fingerprinting a single file
pub type HashOutcome = (PathBuf, Result<Fingerprint>);

/// Calculate a fingerprint from an image file
pub fn fingerprint_from_file<P: AsRef<Path>>(
    path: P,
    algorithm: HashAlgorithm,
    hash_size: u32,
) -> Result<Fingerprint> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let img = image::open(path)?;
    calculate_fingerprint(&img, algorithm, hash_size)
}

/// Fingerprint `path`, pairing the outcome with the path it was computed for.
///
/// Failures are logged here and returned as `Err`; they are never propagated further.
pub fn compute_fingerprint<P: AsRef<Path>>(
    path: P,
    algorithm: HashAlgorithm,
    hash_size: u32,
) -> HashOutcome {
    let path = path.as_ref();
    let result = catch_hash_panic(|| fingerprint_from_file(path, algorithm, hash_size));

    if let Err(e) = &result {
        log_hash_error(path, e);
    }

    (path.to_path_buf(), result)
}

/// Run `hash`, converting a panic into `Error::HashPanic`
pub(crate) fn catch_hash_panic<F>(hash: F) -> Result<Fingerprint>
where
    F: FnOnce() -> Result<Fingerprint>,
{
    panic::catch_unwind(AssertUnwindSafe(hash))
        .unwrap_or_else(|panic_err| Err(Error::HashPanic(panic_message(&*panic_err))))
}

fn panic_message(panic_err: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_err.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
