//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Content hashing and exact grouping (Phase 2)
//! - Perceptual fingerprints and similar-image clustering (Phase 3)
//! - Cross-tree comparison of two catalogs

pub mod compare;
pub mod finder;
pub mod groups;
pub mod similarity;

pub use compare::{compare_catalogs, files_on_side, side_of, CompareStats, Side};
pub use finder::{
    build_catalog, detect_duplicates, group_exact, phase_content_hash, phase_fingerprint,
    validate_root, DetectionSummary, DuplicateFinder, FinderConfig, FinderError, HashPhaseConfig,
    HashStats, DEFAULT_IMAGE_THRESHOLD, DEFAULT_IO_THREADS,
};
pub use groups::{group_by_size, wasted_space, DuplicateGroup, GroupingStats, SizeBucket};
pub use similarity::{cluster_by_seed, cluster_images, similarity_percent, Cluster};
