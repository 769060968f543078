//! Duplicate matching over fingerprint sets.
//!
//! Both sweeps are parallel over base entries. Each worker owns exactly one base path
//! and returns its complete match list, which a single thread then merges into the
//! [`MatchResult`]. Entries are sorted by path first, so "earlier" in the triangular
//! sweep is a stable, path-ordered notion and results do not depend on scheduling.

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::processing::Fingerprint;
use crate::types::{DuplicateMatch, FingerprintSet, MatchResult};

/// Similarity score for a Hamming `distance` between fingerprints of `bit_len` bits.
///
/// Computed as `1 - distance / bit_len^2`, rounded to two decimals.
pub fn similarity(distance: u32, bit_len: usize) -> f64 {
    if bit_len == 0 {
        return 1.0;
    }
    let divisor = (bit_len as f64) * (bit_len as f64);
    round2(1.0 - distance as f64 / divisor)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Entries ordered by path
fn sorted_entries(fingerprints: &FingerprintSet) -> Vec<(&Path, &Fingerprint)> {
    let mut entries: Vec<_> = fingerprints
        .iter()
        .map(|(path, fp)| (path.as_path(), fp))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Compare one base entry against `candidates`, in order
fn match_against<'a, I>(
    base: (&Path, &Fingerprint),
    candidates: I,
    threshold: u32,
) -> Vec<DuplicateMatch>
where
    I: IntoIterator<Item = (&'a Path, &'a Fingerprint)>,
{
    let (base_path, base_fp) = base;
    let bit_len = base_fp.bit_len();

    candidates
        .into_iter()
        .filter_map(|(path, fp)| {
            let distance = base_fp.distance(fp);
            (distance <= threshold).then(|| DuplicateMatch {
                base: base_path.to_path_buf(),
                matched: path.to_path_buf(),
                similarity: similarity(distance, bit_len),
            })
        })
        .collect()
}

/// Merge per-base match lists, leaving out bases without matches
fn merge(per_base: Vec<(PathBuf, Vec<DuplicateMatch>)>) -> MatchResult {
    per_base
        .into_iter()
        .filter(|(_, matches)| !matches.is_empty())
        .collect()
}

/// Find near-duplicates within one fingerprint set.
///
/// With `full_match` off, every unordered pair is compared once and a match is
/// reported only under the path that sorts first. With `full_match` on, every entry
/// is compared with every other entry, so a matching pair shows up under both paths.
/// A pair matches when its Hamming distance is at most `threshold`.
pub fn find_duplicates(
    fingerprints: &FingerprintSet,
    threshold: u32,
    full_match: bool,
) -> MatchResult {
    let entries = sorted_entries(fingerprints);

    let per_base: Vec<_> = (0..entries.len())
        .into_par_iter()
        .map(|i| {
            let matches = if full_match {
                let others = entries
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, entry)| *entry);
                match_against(entries[i], others, threshold)
            } else {
                match_against(entries[i], entries[i + 1..].iter().copied(), threshold)
            };
            (entries[i].0.to_path_buf(), matches)
        })
        .collect();

    let result = merge(per_base);
    log::debug!(
        "{} of {} images have duplicates (threshold {}, full match {})",
        result.len(),
        entries.len(),
        threshold,
        full_match
    );
    result
}

/// Find images of `compare` that resemble images of `base`.
///
/// Every base entry is compared with every compare entry. Identical paths on both
/// sides are not special-cased. Keys of the result always come from `base` and
/// matched paths always from `compare`.
pub fn find_duplicates_across(
    base: &FingerprintSet,
    compare: &FingerprintSet,
    threshold: u32,
) -> MatchResult {
    let base_entries = sorted_entries(base);
    let compare_entries = sorted_entries(compare);

    let per_base: Vec<_> = base_entries
        .par_iter()
        .map(|&entry| {
            (
                entry.0.to_path_buf(),
                match_against(entry, compare_entries.iter().copied(), threshold),
            )
        })
        .collect();

    let result = merge(per_base);
    log::debug!(
        "{} of {} base images found in a set of {} (threshold {})",
        result.len(),
        base_entries.len(),
        compare_entries.len(),
        threshold
    );
    result
}
