//! Extension-based classification of catalog entries.
//!
//! Files with a known raster image extension go through perceptual
//! fingerprinting; everything else goes through exact content hashing.
//! Exact mode sends every file down the content-hash path.

use std::path::Path;

use super::FileRecord;

/// Extensions (lowercase, no dot) treated as images.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "heic"];

/// Check whether a path has an image extension (case-insensitive).
///
/// No I/O is performed; the file content is never inspected.
///
/// # Example
///
/// ```
/// use doppel::scanner::is_image;
/// use std::path::Path;
///
/// assert!(is_image(Path::new("holiday.JPG")));
/// assert!(!is_image(Path::new("notes.txt")));
/// ```
#[must_use]
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Catalog split into the perceptual and exact-hash subsets.
///
/// Both lists keep the relative order of the input catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    /// Files to fingerprint perceptually
    pub images: Vec<FileRecord>,
    /// Files to bucket by size and digest
    pub generic: Vec<FileRecord>,
}

/// Partition a catalog into images and generic files.
///
/// With `exact_mode` set, `images` is always empty.
#[must_use]
pub fn partition(catalog: &[FileRecord], exact_mode: bool) -> Classified {
    let mut classified = Classified::default();

    for record in catalog {
        if !exact_mode && is_image(&record.path) {
            classified.images.push(record.clone());
        } else {
            classified.generic.push(record.clone());
        }
    }

    log::debug!(
        "Classified {} files: {} images, {} generic (exact mode: {})",
        catalog.len(),
        classified.images.len(),
        classified.generic.len(),
        exact_mode
    );

    classified
}
