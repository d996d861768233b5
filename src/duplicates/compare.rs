//! Cross-tree duplicate detection.
//!
//! Compares two catalogs by content digest only. A file of the second
//! catalog that matches content in the first produces a group made of every
//! first-catalog file with that digest followed by the second-catalog file.
//! Each digest yields at most one group: later second-catalog files with an
//! already reported digest are not added.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::finder::{phase_content_hash, HashPhaseConfig};
use super::groups::DuplicateGroup;
use crate::scanner::{FileRecord, Hash, Hasher};

/// Which of the two compared trees a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The first directory given on the command line
    First,
    /// The second directory given on the command line
    Second,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "1"),
            Self::Second => write!(f, "2"),
        }
    }
}

/// Attribute `path` to a side by path containment.
///
/// When one root is nested in the other, the deeper root wins.
#[must_use]
pub fn side_of(path: &Path, first_root: &Path, second_root: &Path) -> Option<Side> {
    let in_first = path.starts_with(first_root);
    let in_second = path.starts_with(second_root);

    match (in_first, in_second) {
        (true, true) => {
            if second_root.components().count() > first_root.components().count() {
                Some(Side::Second)
            } else {
                Some(Side::First)
            }
        }
        (true, false) => Some(Side::First),
        (false, true) => Some(Side::Second),
        (false, false) => None,
    }
}

/// Files of `group` that belong to `side`, in group order.
#[must_use]
pub fn files_on_side<'a>(
    group: &'a DuplicateGroup,
    side: Side,
    first_root: &Path,
    second_root: &Path,
) -> Vec<&'a FileRecord> {
    group
        .files
        .iter()
        .filter(|f| side_of(&f.path, first_root, second_root) == Some(side))
        .collect()
}

/// Statistics from a catalog comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareStats {
    /// Files in the first catalog
    pub first_files: usize,
    /// Files in the second catalog
    pub second_files: usize,
    /// Files whose size occurs on both sides (and were therefore hashed)
    pub candidates: usize,
    /// Files dropped because they could not be read
    pub failed_files: usize,
    /// Number of cross-tree groups
    pub groups: usize,
}

/// Find files of `second` whose content also exists in `first`.
///
/// Sizes are matched across both catalogs together, so only sizes present
/// on both sides are hashed. Groups follow the order of `second`.
#[must_use]
pub fn compare_catalogs(
    first: &[FileRecord],
    second: &[FileRecord],
    hasher: &Hasher,
    config: &HashPhaseConfig,
) -> (Vec<DuplicateGroup>, CompareStats) {
    let mut stats = CompareStats {
        first_files: first.len(),
        second_files: second.len(),
        ..Default::default()
    };

    let first_sizes: HashSet<u64> = first.iter().filter(|f| f.size > 0).map(|f| f.size).collect();
    let shared_sizes: HashSet<u64> = second
        .iter()
        .map(|f| f.size)
        .filter(|size| first_sizes.contains(size))
        .collect();

    let select = |files: &[FileRecord]| -> Vec<FileRecord> {
        files
            .iter()
            .filter(|f| shared_sizes.contains(&f.size))
            .cloned()
            .collect()
    };
    let first_candidates = select(first);
    let second_candidates = select(second);
    stats.candidates = first_candidates.len() + second_candidates.len();

    log::info!(
        "Comparing {} and {} files: {} share a size across trees",
        stats.first_files,
        stats.second_files,
        stats.candidates
    );

    if first_candidates.is_empty() || second_candidates.is_empty() {
        return (Vec::new(), stats);
    }

    let (first_hashed, first_stats) = phase_content_hash(first_candidates, hasher, config);
    let (second_hashed, second_stats) = phase_content_hash(second_candidates, hasher, config);
    stats.failed_files = first_stats.failed_files + second_stats.failed_files;

    let mut by_digest: HashMap<Hash, Vec<FileRecord>> = HashMap::new();
    for file in &first_hashed {
        if let Some(digest) = file.digest() {
            by_digest.entry(*digest).or_default().push(file.record.clone());
        }
    }

    let mut groups = Vec::new();
    for file in &second_hashed {
        let Some(digest) = file.digest() else {
            continue;
        };
        if let Some(mut files) = by_digest.remove(digest) {
            files.push(file.record.clone());
            let mut group = DuplicateGroup::exact(digest, files);
            group.representative_size = file.record.size;
            groups.push(group);
        }
    }

    stats.groups = groups.len();
    log::info!("Found {} cross-tree duplicate groups", stats.groups);

    (groups, stats)
}
