//! Duplicate groups and size-based file bucketing.
//!
//! # Overview
//!
//! This module provides the size bucketer (the cheap first pass of exact
//! duplicate detection) and the [`DuplicateGroup`] type produced by both
//! the exact grouper and the similarity clusterer.
//!
//! ## Size Bucketing
//!
//! Files with different sizes cannot be byte-identical, and a file whose
//! size is unique cannot have a duplicate. Buckets holding a single file are
//! therefore dropped before any content is read.
//!
//! # Example
//!
//! ```
//! use doppel::scanner::FileRecord;
//! use doppel::duplicates::group_by_size;
//!
//! let files = vec![
//!     FileRecord::new("/file1.txt", 1024),
//!     FileRecord::new("/file2.txt", 1024),
//!     FileRecord::new("/file3.txt", 2048),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(buckets.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileRecord, Fingerprint, Hash};

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size, in input order
    pub files: Vec<FileRecord>,
}

impl SizeBucket {
    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this bucket has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Statistics from the size bucketing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of empty files encountered (size 0, never bucketed)
    pub empty_files: usize,
    /// Number of size buckets with 2+ files
    pub duplicate_buckets: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size bucketing.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by exact size, keeping only buckets with 2+ files.
///
/// Buckets are returned in order of their first file's position in the
/// input, and each bucket keeps input order. Zero-byte files are skipped.
///
/// # Performance
///
/// - Time complexity: O(n)
/// - No file I/O is performed (metadata only)
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (Vec<SizeBucket>, GroupingStats) {
    let mut buckets: Vec<SizeBucket> = Vec::new();
    let mut index_by_size: HashMap<u64, usize> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;

        if file.size == 0 {
            stats.empty_files += 1;
            log::debug!("Empty file encountered: {}", file.path.display());
            continue;
        }

        let idx = *index_by_size.entry(file.size).or_insert_with(|| {
            buckets.push(SizeBucket {
                size: file.size,
                files: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[idx].files.push(file);
    }

    if stats.empty_files > 0 {
        log::warn!("Skipped {} empty file(s)", stats.empty_files);
    }

    stats.unique_sizes = buckets.len();

    let filtered: Vec<SizeBucket> = buckets
        .into_iter()
        .filter(|bucket| {
            if bucket.has_duplicates() {
                stats.potential_duplicates += bucket.len();
                stats.duplicate_buckets += 1;
                log::debug!(
                    "Size bucket {} bytes: {} potential duplicates",
                    bucket.size,
                    bucket.len()
                );
                true
            } else {
                stats.eliminated_unique += bucket.len();
                log::trace!("Eliminated unique size {}", bucket.size);
                false
            }
        })
        .collect();

    log::info!(
        "Size bucketing: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (filtered, stats)
}

/// A set of files considered the same.
///
/// Exact groups share a content digest. Image groups are anchored on their
/// first file (the seed): every other member is within the similarity
/// threshold of the seed, but not necessarily of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Hex content digest, or the seed fingerprint for image groups
    pub key: String,
    /// Member files; the first one is the representative
    pub files: Vec<FileRecord>,
    /// Size of the representative file in bytes
    pub representative_size: u64,
    /// Whether the group came from perceptual similarity
    pub is_image: bool,
    /// 100 for exact groups, derived from average distance for images
    pub similarity_percent: u8,
}

impl DuplicateGroup {
    /// Create an exact (content-identical) group.
    #[must_use]
    pub fn exact(digest: &Hash, files: Vec<FileRecord>) -> Self {
        let representative_size = files.first().map_or(0, |f| f.size);
        Self {
            key: hash_to_hex(digest),
            files,
            representative_size,
            is_image: false,
            similarity_percent: 100,
        }
    }

    /// Create a similar-image group anchored on `files[0]`.
    #[must_use]
    pub fn similar(seed: &Fingerprint, files: Vec<FileRecord>, similarity_percent: u8) -> Self {
        let representative_size = files.first().map_or(0, |f| f.size);
        Self {
            key: seed.to_hex(),
            files,
            representative_size,
            is_image: true,
            similarity_percent,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of redundant copies (total - 1 representative).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes reclaimable by keeping only the representative.
    ///
    /// Uses the representative size for every member, which is exact for
    /// content groups and an approximation for image groups.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.representative_size * self.duplicate_count() as u64
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Total reclaimable bytes across all groups.
///
/// `Σ representative_size × (members − 1)`
#[must_use]
pub fn wasted_space(groups: &[DuplicateGroup]) -> u64 {
    groups.iter().map(DuplicateGroup::wasted_space).sum()
}
