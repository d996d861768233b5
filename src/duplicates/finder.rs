//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the detection pipeline over a file catalog:
//! 1. **Classify**: split the catalog into images and generic files
//! 2. **Phase 1 - Size grouping**: bucket generic files by size (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Content hash**: BLAKE3 digest of every file in a surviving bucket
//! 4. **Phase 3 - Fingerprint**: perceptual hash of every image
//! 5. **Grouping**: exact groups by digest, similar-image groups by seed-anchored clustering
//!
//! The report lists image groups first, then exact groups.
//!
//! # Example
//!
//! ```no_run
//! use doppel::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_image_threshold(8));
//! let (groups, summary) = finder
//!     .scan_directory(Path::new("."), &Default::default())
//!     .unwrap();
//!
//! println!("{} groups, {} bytes reclaimable", groups.len(), summary.reclaimable_space);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_size, wasted_space, DuplicateGroup};
use super::similarity::cluster_images;
use crate::progress::ProgressCallback;
use crate::scanner::{
    hash_to_hex, partition, FileRecord, Hash, HashedFile, Hasher, PerceptualAlgorithm,
    PerceptualHasher, ScanError, Walker, WalkerConfig,
};

/// Default number of I/O threads used for hashing.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Default maximum Hamming distance for two images to be "similar".
pub const DEFAULT_IMAGE_THRESHOLD: u32 = 5;

/// Files above this size get a debug line when hashed (100 MB).
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Run `op` on a dedicated pool of `threads` workers.
///
/// Falls back to the calling thread if the pool cannot be built.
fn run_in_pool<T: Send>(threads: usize, op: impl FnOnce() -> T + Send) -> T {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            log::warn!("Failed to create thread pool ({e}), hashing on the current thread");
            op()
        }
    }
}

/// Configuration shared by the hashing phases.
#[derive(Clone)]
pub struct HashPhaseConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashPhaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashPhaseConfig")
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashPhaseConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            progress_callback: None,
        }
    }
}

impl HashPhaseConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Statistics from a hashing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStats {
    /// Number of files handed to the phase
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Number of files dropped because they could not be read or decoded
    pub failed_files: usize,
    /// Total bytes of successfully hashed files
    pub bytes_hashed: u64,
}

/// Shared driver for the two hashing phases.
///
/// Results keep input order; failures are logged and dropped.
fn run_hash_phase<E: std::fmt::Display>(
    phase: &str,
    files: Vec<FileRecord>,
    config: &HashPhaseConfig,
    compute: impl Fn(&FileRecord) -> Result<HashedFile, E> + Sync,
) -> (Vec<HashedFile>, HashStats) {
    let mut stats = HashStats {
        input_files: files.len(),
        ..Default::default()
    };

    if files.is_empty() {
        log::debug!("{phase}: no files to process");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(phase, files.len());
    }

    let results: Vec<Option<HashedFile>> = run_in_pool(config.io_threads, || {
        files
            .par_iter()
            .enumerate()
            .map(|(idx, file)| {
                if file.size > LARGE_FILE_THRESHOLD {
                    log::debug!(
                        "Hashing large file ({} MB): {}",
                        file.size / (1024 * 1024),
                        file.path.display()
                    );
                }

                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
                }

                match compute(file) {
                    Ok(hashed) => {
                        log::trace!("{phase}: {}", file.path.display());
                        if let Some(ref callback) = config.progress_callback {
                            callback.on_item_completed(file.size);
                        }
                        Some(hashed)
                    }
                    Err(e) => {
                        log::warn!("Skipping {}: {}", file.path.display(), e);
                        None
                    }
                }
            })
            .collect()
    });

    let hashed: Vec<HashedFile> = results.into_iter().flatten().collect();

    stats.hashed_files = hashed.len();
    stats.failed_files = stats.input_files - stats.hashed_files;
    stats.bytes_hashed = hashed.iter().map(|f| f.record.size).sum();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(phase);
    }

    (hashed, stats)
}

/// Compute full-content digests for `files`.
///
/// Unreadable files are dropped and counted in [`HashStats::failed_files`].
/// The output keeps the input order.
#[must_use]
pub fn phase_content_hash(
    files: Vec<FileRecord>,
    hasher: &Hasher,
    config: &HashPhaseConfig,
) -> (Vec<HashedFile>, HashStats) {
    log::info!("Phase 2: Computing content hashes for {} files", files.len());

    let (hashed, stats) = run_hash_phase("hashing", files, config, |file| {
        hasher
            .full_hash(&file.path)
            .map(|digest| HashedFile::with_digest(file.clone(), digest))
    });

    log::info!(
        "Phase 2 complete: {} hashed, {} failed, {} bytes read",
        stats.hashed_files,
        stats.failed_files,
        stats.bytes_hashed
    );

    (hashed, stats)
}

/// Compute perceptual fingerprints for `images`.
///
/// Files that cannot be decoded are dropped; they are not retried as
/// generic files. The output keeps the input order.
#[must_use]
pub fn phase_fingerprint(
    images: Vec<FileRecord>,
    hasher: &PerceptualHasher,
    config: &HashPhaseConfig,
) -> (Vec<HashedFile>, HashStats) {
    log::info!(
        "Phase 3: Computing {} fingerprints for {} images",
        hasher.algorithm(),
        images.len()
    );

    let (hashed, stats) = run_hash_phase("fingerprinting", images, config, |file| {
        hasher
            .compute(&file.path)
            .map(|fp| HashedFile::with_fingerprint(file.clone(), fp))
    });

    log::info!(
        "Phase 3 complete: {} fingerprinted, {} undecodable",
        stats.hashed_files,
        stats.failed_files
    );

    (hashed, stats)
}

/// Group digested files by equal digest.
///
/// Groups come out in order of their first member, and members keep input
/// order. Digests shared by fewer than two files produce no group.
#[must_use]
pub fn group_exact(hashed: &[HashedFile]) -> Vec<DuplicateGroup> {
    let mut order: Vec<(Hash, Vec<FileRecord>)> = Vec::new();
    let mut index_by_digest: HashMap<Hash, usize> = HashMap::new();

    for file in hashed {
        let Some(digest) = file.digest() else {
            continue;
        };
        let idx = *index_by_digest.entry(*digest).or_insert_with(|| {
            order.push((*digest, Vec::new()));
            order.len() - 1
        });
        order[idx].1.push(file.record.clone());
    }

    order
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(digest, files)| {
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                hash_to_hex(&digest),
                files.len(),
                files.first().map_or(0, |f| f.size)
            );
            DuplicateGroup::exact(&digest, files)
        })
        .collect()
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Send every file, images included, through content hashing.
    pub exact_mode: bool,
    /// Maximum fingerprint distance for two images to be grouped.
    /// Ignored in exact mode.
    pub image_threshold: u32,
    /// Perceptual hashing algorithm for images.
    pub algorithm: PerceptualAlgorithm,
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("exact_mode", &self.exact_mode)
            .field("image_threshold", &self.image_threshold)
            .field("algorithm", &self.algorithm)
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            exact_mode: false,
            image_threshold: DEFAULT_IMAGE_THRESHOLD,
            algorithm: PerceptualAlgorithm::default(),
            io_threads: DEFAULT_IO_THREADS,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Enable or disable exact mode.
    #[must_use]
    pub fn with_exact_mode(mut self, exact: bool) -> Self {
        self.exact_mode = exact;
        self
    }

    /// Set the image similarity threshold.
    #[must_use]
    pub fn with_image_threshold(mut self, threshold: u32) -> Self {
        self.image_threshold = threshold;
        self
    }

    /// Set the perceptual hashing algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: PerceptualAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Hash phase settings derived from this configuration.
    #[must_use]
    pub fn hash_phase(&self) -> HashPhaseConfig {
        HashPhaseConfig {
            io_threads: self.io_threads.max(1),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics from a detection run.
#[derive(Debug, Default)]
pub struct DetectionSummary {
    /// Number of catalog entries
    pub total_files: usize,
    /// Total size of all catalog entries in bytes
    pub total_size: u64,
    /// Entries classified as images (0 in exact mode)
    pub image_files: usize,
    /// Entries sent through size bucketing
    pub generic_files: usize,
    /// Generic files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files successfully digested
    pub hashed_files: usize,
    /// Images successfully fingerprinted
    pub fingerprinted_files: usize,
    /// Files dropped because they could not be read or decoded
    pub failed_files: usize,
    /// Number of exact groups
    pub exact_groups: usize,
    /// Number of similar-image groups
    pub image_groups: usize,
    /// Total number of redundant files (excluding representatives)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Entries the walker could not read (directory scans only)
    pub scan_errors: Vec<ScanError>,
    /// Duration of the run
    pub duration: Duration,
}

impl DetectionSummary {
    /// Total number of groups of either kind.
    #[must_use]
    pub fn duplicate_groups(&self) -> usize {
        self.exact_groups + self.image_groups
    }

    /// Percentage of scanned bytes that are reclaimable.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Check that `root` exists and is a directory.
///
/// # Errors
///
/// Returns [`FinderError::PathNotFound`] or [`FinderError::NotADirectory`].
pub fn validate_root(root: &Path) -> Result<(), FinderError> {
    if !root.exists() {
        return Err(FinderError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(FinderError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Walk `root` into a catalog, collecting per-entry errors.
///
/// # Errors
///
/// Returns [`FinderError`] if `root` is missing or not a directory.
pub fn build_catalog(
    root: &Path,
    walker_config: &WalkerConfig,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<(Vec<FileRecord>, Vec<ScanError>), FinderError> {
    validate_root(root)?;

    if let Some(callback) = progress {
        callback.on_phase_start("walking", 0);
        callback.on_message(&format!("Walking {}", root.display()));
    }

    let walker = Walker::new(root, walker_config.clone());
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for result in walker.walk() {
        match result {
            Ok(file) => {
                if let Some(callback) = progress {
                    callback.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                }
                files.push(file);
            }
            Err(e) => errors.push(e),
        }
    }

    if let Some(callback) = progress {
        callback.on_phase_end("walking");
    }

    log::info!(
        "Found {} files under {} ({} unreadable entries)",
        files.len(),
        root.display(),
        errors.len()
    );

    Ok((files, errors))
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```
/// use doppel::duplicates::DuplicateFinder;
///
/// let finder = DuplicateFinder::with_defaults();
/// let (groups, summary) = finder.detect(&[]);
///
/// assert!(groups.is_empty());
/// assert_eq!(summary.duplicate_groups(), 0);
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
    perceptual: PerceptualHasher,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let perceptual = PerceptualHasher::new(config.algorithm);
        Self {
            config,
            hasher: Hasher::new(),
            perceptual,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find exact and similar-image groups in a catalog.
    ///
    /// Never fails: unreadable and undecodable files are dropped and
    /// counted in the summary. Image groups come before exact groups.
    #[must_use]
    pub fn detect(&self, catalog: &[FileRecord]) -> (Vec<DuplicateGroup>, DetectionSummary) {
        let start_time = Instant::now();
        let phase_config = self.config.hash_phase();
        let mut summary = DetectionSummary {
            total_files: catalog.len(),
            total_size: catalog.iter().map(|f| f.size).sum(),
            ..Default::default()
        };

        let classified = partition(catalog, self.config.exact_mode);
        summary.image_files = classified.images.len();
        summary.generic_files = classified.generic.len();

        // Image path
        let image_groups = if classified.images.is_empty() {
            Vec::new()
        } else {
            let (fingerprinted, stats) =
                phase_fingerprint(classified.images, &self.perceptual, &phase_config);
            summary.fingerprinted_files = stats.hashed_files;
            summary.failed_files += stats.failed_files;
            cluster_images(
                &fingerprinted,
                self.config.image_threshold,
                self.config.algorithm.bits(),
            )
        };

        // Generic path
        log::info!("Phase 1: Grouping by size...");
        let (buckets, size_stats) = group_by_size(classified.generic.iter().cloned());
        summary.eliminated_by_size = size_stats.eliminated_unique + size_stats.empty_files;

        let candidate_sizes: HashSet<u64> = buckets.iter().map(|b| b.size).collect();
        let candidates: Vec<FileRecord> = classified
            .generic
            .into_iter()
            .filter(|f| candidate_sizes.contains(&f.size))
            .collect();

        let exact_groups = if candidates.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            Vec::new()
        } else {
            let (hashed, stats) = phase_content_hash(candidates, &self.hasher, &phase_config);
            summary.hashed_files = stats.hashed_files;
            summary.failed_files += stats.failed_files;
            group_exact(&hashed)
        };

        summary.image_groups = image_groups.len();
        summary.exact_groups = exact_groups.len();

        let mut groups = image_groups;
        groups.extend(exact_groups);

        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = wasted_space(&groups);
        summary.duration = start_time.elapsed();

        log::info!(
            "Detection complete: {} image groups, {} exact groups, {} bytes reclaimable in {:.2?}",
            summary.image_groups,
            summary.exact_groups,
            summary.reclaimable_space,
            summary.duration
        );

        (groups, summary)
    }

    /// Walk a directory and run detection over its catalog.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if the path does not exist or is not a
    /// directory. Unreadable entries inside the tree are reported in
    /// [`DetectionSummary::scan_errors`].
    pub fn scan_directory(
        &self,
        root: &Path,
        walker_config: &WalkerConfig,
    ) -> Result<(Vec<DuplicateGroup>, DetectionSummary), FinderError> {
        log::info!("Starting duplicate scan of {}", root.display());
        let start_time = Instant::now();

        let (catalog, scan_errors) =
            build_catalog(root, walker_config, self.config.progress_callback.as_ref())?;

        let (groups, mut summary) = self.detect(&catalog);
        summary.scan_errors = scan_errors;
        summary.duration = start_time.elapsed();

        Ok((groups, summary))
    }
}

/// Detect duplicates in a catalog with default threading.
///
/// `image_threshold` is ignored when `exact_mode` is true.
///
/// # Example
///
/// ```
/// use doppel::duplicates::detect_duplicates;
///
/// assert!(detect_duplicates(&[], false, 5).is_empty());
/// ```
#[must_use]
pub fn detect_duplicates(
    catalog: &[FileRecord],
    exact_mode: bool,
    image_threshold: u32,
) -> Vec<DuplicateGroup> {
    let config = FinderConfig::default()
        .with_exact_mode(exact_mode)
        .with_image_threshold(image_threshold);
    DuplicateFinder::new(config).detect(catalog).0
}
