use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::processing::Fingerprint;

/// Supported image formats
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Other(String),
}

impl ImageFormat {
    /// Determine format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            other => Self::Other(other.to_string()),
        }
    }

    /// Check if format is supported
    pub fn is_supported(&self) -> bool {
        match self {
            Self::Jpeg | Self::Png => true,
            Self::Other(_) => false,
        }
    }
}

/// Fingerprints of every image found in one directory, keyed by path.
///
/// All entries share one algorithm and hash size.
pub type FingerprintSet = HashMap<PathBuf, Fingerprint>;

/// One near-duplicate relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// The image the comparison started from
    pub base: PathBuf,

    /// The image found to resemble `base`
    pub matched: PathBuf,

    /// 1.0 = identical fingerprints, rounded to two decimals
    pub similarity: f64,
}

/// Matches grouped by base path, in comparison order.
///
/// A base path without matches never appears as a key.
pub type MatchResult = HashMap<PathBuf, Vec<DuplicateMatch>>;
