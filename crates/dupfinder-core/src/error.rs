use std::path::PathBuf;
use thiserror::Error;

use crate::processing::HashAlgorithm;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the dupfinder library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or processing error
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Directory traversal error
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File or directory not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Unsupported image format or unknown algorithm name
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding or hashing panicked; the panic was contained to one file
    #[error("Hash computation panicked: {0}")]
    HashPanic(String),

    /// The algorithm cannot produce a fingerprint of the requested size
    #[error("{algorithm} cannot use hash size {hash_size}: {reason}")]
    InvalidHashSize {
        algorithm: HashAlgorithm,
        hash_size: u32,
        reason: String,
    },
}
