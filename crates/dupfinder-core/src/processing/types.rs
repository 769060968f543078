/// HashAlgorithm enum and Fingerprint bit matrix
///
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Default fingerprint edge length (8x8 = 64 bits)
pub const DEFAULT_HASH_SIZE: u32 = 8;

/// Largest accepted fingerprint edge length (64x64 = 4096 bits)
pub const MAX_HASH_SIZE: u32 = 64;

/// Perceptual hash algorithms supported by the fingerprint engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// DCT-based perceptual hash
    #[default]
    Phash,

    /// Horizontal difference hash
    Dhash,

    /// Haar wavelet hash
    Whash,
}

impl HashAlgorithm {
    /// All algorithms, in presentation order
    pub const ALL: [HashAlgorithm; 3] = [Self::Phash, Self::Dhash, Self::Whash];

    /// Hamming-distance threshold callers use when none is configured
    pub fn default_threshold(&self) -> u32 {
        match self {
            Self::Phash => 12,
            Self::Dhash => 10,
            Self::Whash => 12,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Phash => "phash",
            Self::Dhash => "dhash",
            Self::Whash => "whash",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "phash" => Ok(Self::Phash),
            "dhash" => Ok(Self::Dhash),
            "whash" => Ok(Self::Whash),
            other => Err(Error::UnsupportedFormat(format!(
                "unknown hash algorithm '{}'",
                other
            ))),
        }
    }
}

/// A hash_size x hash_size bit matrix, stored row-major in 64-bit words
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    hash_size: u32,
    words: Box<[u64]>,
}

impl Fingerprint {
    /// Pack a row-major sequence of bits into a fingerprint.
    ///
    /// Missing trailing bits are treated as unset; surplus bits are ignored.
    pub fn from_bits<I>(hash_size: u32, bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let bit_len = (hash_size as usize) * (hash_size as usize);
        let mut words = vec![0u64; bit_len.div_ceil(64)];

        for (i, bit) in bits.into_iter().take(bit_len).enumerate() {
            if bit {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }

        Self {
            hash_size,
            words: words.into_boxed_slice(),
        }
    }

    /// Edge length of the bit matrix
    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }

    /// Number of bits (hash_size squared)
    pub fn bit_len(&self) -> usize {
        (self.hash_size as usize) * (self.hash_size as usize)
    }

    /// Value of the bit at `row`, `col`
    pub fn bit(&self, row: u32, col: u32) -> bool {
        let i = row as usize * self.hash_size as usize + col as usize;
        self.words[i / 64] & (1u64 << (i % 64)) != 0
    }

    /// Calculate the Hamming distance between two fingerprints.
    ///
    /// Both sides must come from the same algorithm and hash size.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        debug_assert_eq!(
            self.hash_size, other.hash_size,
            "comparing fingerprints of different sizes"
        );
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Hex rendering, row-major, four bits per digit with the first bit as MSB
    pub fn to_hex(&self) -> String {
        let bits: Vec<bool> = (0..self.bit_len())
            .map(|i| self.words[i / 64] & (1u64 << (i % 64)) != 0)
            .collect();

        bits.chunks(4)
            .map(|nibble| {
                let value = nibble
                    .iter()
                    .enumerate()
                    .fold(0u32, |acc, (i, &b)| acc | ((b as u32) << (3 - i)));
                std::char::from_digit(value, 16).unwrap_or('0')
            })
            .collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
