use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::logging::log_file_error;
use crate::types::ImageFormat;

/// Discover candidate image files under `directory`.
///
/// Only direct children are listed unless `recursive` is set. The result is sorted so
/// that downstream chunking is stable between runs.
pub fn discover_images(directory: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    // Check if directory exists
    if !directory.is_dir() {
        return Err(Error::FileNotFound(directory.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut image_files = Vec::new();

    for entry in WalkDir::new(directory).min_depth(1).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                // Log error but continue with other entries
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                log_file_error(&path, "walk", &e);
                continue;
            }
        };

        // Follows symlinks, unlike entry.file_type()
        if entry.path().is_file() && is_image_path(entry.path()) {
            image_files.push(entry.into_path());
        }
    }

    image_files.sort();
    Ok(image_files)
}

/// Get image format from file extension
fn get_image_format(path: &Path) -> Option<ImageFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(ImageFormat::from_extension)
}

/// Returns if the given path has a supported image extension
pub fn is_image_path(path: &Path) -> bool {
    match get_image_format(path) {
        Some(format) => format.is_supported(),
        None => false,
    }
}

// -- Tests --
