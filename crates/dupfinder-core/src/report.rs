//! Flattened, sorted view of a [`MatchResult`] for display.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{DuplicateMatch, MatchResult};

const MIB: u64 = 1024 * 1024;

/// One (base, matched, similarity) row of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub base: PathBuf,
    pub matched: PathBuf,
    pub similarity: f64,
}

impl ReportRow {
    /// Similarity as a percentage, e.g. "98%"
    pub fn similarity_percent(&self) -> String {
        format!("{}%", (self.similarity * 100.0).round() as i64)
    }
}

impl From<&DuplicateMatch> for ReportRow {
    fn from(m: &DuplicateMatch) -> Self {
        Self {
            base: m.base.clone(),
            matched: m.matched.clone(),
            similarity: m.similarity,
        }
    }
}

/// Every match of a search, most similar first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    rows: Vec<ReportRow>,
}

impl DuplicateReport {
    /// Flatten `matches` into rows sorted by similarity, highest first.
    /// Ties are ordered by base path, then matched path.
    pub fn from_matches(matches: &MatchResult) -> Self {
        let mut rows: Vec<ReportRow> = matches
            .values()
            .flat_map(|list| list.iter().map(ReportRow::from))
            .collect();

        rows.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.base.cmp(&b.base))
                .then_with(|| a.matched.cmp(&b.matched))
        });

        Self { rows }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop every row that mentions `path` on either side, e.g. after the file was
    /// discarded. Returns the number of rows removed.
    pub fn remove_path(&mut self, path: &Path) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.base != path && row.matched != path);
        before - self.rows.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{:>4}  {:>4}  {}  <->  {}",
                i + 1,
                row.similarity_percent(),
                row.base.display(),
                row.matched.display()
            )?;
        }
        Ok(())
    }
}

/// Name, resolution and size of an image on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetails {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

impl ImageDetails {
    /// Read details from the file header without decoding the pixels
    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let size_bytes = std::fs::metadata(path)?.len();
        let (width, height) = image::image_dimensions(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            width,
            height,
            size_bytes,
        })
    }

    /// "N KB" below one MiB, "N MB" otherwise
    pub fn human_size(&self) -> String {
        if self.size_bytes < MIB {
            format!("{} KB", (self.size_bytes as f64 / 1024.0).round() as u64)
        } else {
            format!("{} MB", (self.size_bytes as f64 / MIB as f64).round() as u64)
        }
    }

    pub fn resolution(&self) -> String {
        format!("{} X {}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{save_image, scene};
    use tempfile::tempdir;

    fn m(base: &str, matched: &str, similarity: f64) -> DuplicateMatch {
        DuplicateMatch {
            base: PathBuf::from(base),
            matched: PathBuf::from(matched),
            similarity,
        }
    }

    fn sample() -> MatchResult {
        let mut result = MatchResult::new();
        result.insert(
            PathBuf::from("b.jpg"),
            vec![m("b.jpg", "c.jpg", 0.99), m("b.jpg", "d.jpg", 1.0)],
        );
        result.insert(PathBuf::from("a.jpg"), vec![m("a.jpg", "c.jpg", 0.99)]);
        result
    }

    #[test]
    fn test_rows_sorted_by_similarity_then_path() {
        let report = DuplicateReport::from_matches(&sample());
        let rows: Vec<_> = report
            .rows()
            .iter()
            .map(|r| (r.base.to_str().unwrap(), r.matched.to_str().unwrap()))
            .collect();

        assert_eq!(
            rows,
            vec![("b.jpg", "d.jpg"), ("a.jpg", "c.jpg"), ("b.jpg", "c.jpg")]
        );
    }

    #[test]
    fn test_remove_path_drops_rows_on_either_side() {
        let mut report = DuplicateReport::from_matches(&sample());

        assert_eq!(report.remove_path(Path::new("c.jpg")), 2);
        assert_eq!(report.len(), 1);
        assert_eq!(report.remove_path(Path::new("nothing.jpg")), 0);
        assert_eq!(report.remove_path(Path::new("b.jpg")), 1);
        assert!(report.is_empty());
    }

    #[test]
    fn test_similarity_percent() {
        let row = ReportRow::from(&m("a", "b", 0.98));
        assert_eq!(row.similarity_percent(), "98%");
        let row = ReportRow::from(&m("a", "b", 1.0));
        assert_eq!(row.similarity_percent(), "100%");
    }

    #[test]
    fn test_empty_report() {
        let report = DuplicateReport::from_matches(&MatchResult::new());
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn test_image_details() {
        let dir = tempdir().unwrap();
        let path = save_image(dir.path(), "photo.png", &scene(40, 30, 0));

        let details = ImageDetails::read(&path).unwrap();
        assert_eq!(details.name, "photo.png");
        assert_eq!((details.width, details.height), (40, 30));
        assert_eq!(details.resolution(), "40 X 30");
        assert!(details.size_bytes > 0);

        assert!(matches!(
            ImageDetails::read(&dir.path().join("gone.png")),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_human_size() {
        let details = |size_bytes| ImageDetails {
            name: String::new(),
            width: 1,
            height: 1,
            size_bytes,
        };
        assert_eq!(details(512).human_size(), "1 KB");
        assert_eq!(details(200 * 1024).human_size(), "200 KB");
        assert_eq!(details(3 * MIB + MIB / 2).human_size(), "4 MB");
    }
}
