//! Scanner module for file discovery, classification and hashing.
//!
//! This module provides functionality for:
//! - Directory walking using jwalk (the file catalog)
//! - Image/generic classification by extension
//! - Content hashing with BLAKE3
//! - Perceptual fingerprints for images
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`classify`]: Extension-based image detection
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//! - [`perceptual`]: Difference-hash fingerprints and Hamming distance
//!
//! # Example
//!
//! ```no_run
//! use doppel::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     min_size: Some(1024),
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod classify;
pub mod hasher;
pub mod perceptual;
pub mod walker;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use classify::{is_image, partition, Classified, IMAGE_EXTENSIONS};
pub use hasher::{hash_to_hex, hex_to_hash, Hash, Hasher};
pub use perceptual::{Fingerprint, PerceptualAlgorithm, PerceptualError, PerceptualHasher};
pub use walker::Walker;

/// A discovered file: path plus size.
///
/// Records are produced by the catalog (usually [`Walker`]) and never
/// change afterwards. The path is the identity of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path to the file as discovered
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// File name component for display, falling back to the full path.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Parent directory for display.
    #[must_use]
    pub fn location(&self) -> String {
        self.path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

/// What a file was hashed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// BLAKE3 digest of the full content
    Digest(Hash),
    /// Perceptual fingerprint of the decoded image
    Fingerprint(Fingerprint),
}

/// A file record paired with its computed signature.
///
/// Files whose signature could not be computed never become a `HashedFile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// The catalog record
    pub record: FileRecord,
    /// Content digest or perceptual fingerprint
    pub signature: Signature,
}

impl HashedFile {
    /// Pair a record with its content digest.
    #[must_use]
    pub fn with_digest(record: FileRecord, digest: Hash) -> Self {
        Self {
            record,
            signature: Signature::Digest(digest),
        }
    }

    /// Pair a record with its perceptual fingerprint.
    #[must_use]
    pub fn with_fingerprint(record: FileRecord, fingerprint: Fingerprint) -> Self {
        Self {
            record,
            signature: Signature::Fingerprint(fingerprint),
        }
    }

    /// Whether this file went through the perceptual path.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.signature, Signature::Fingerprint(_))
    }

    /// The content digest, if this file was digested.
    #[must_use]
    pub fn digest(&self) -> Option<&Hash> {
        match &self.signature {
            Signature::Digest(hash) => Some(hash),
            Signature::Fingerprint(_) => None,
        }
    }

    /// The perceptual fingerprint, if this file was fingerprinted.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match &self.signature {
            Signature::Fingerprint(fp) => Some(fp),
            Signature::Digest(_) => None,
        }
    }
}

/// Configuration for directory walking.
///
/// Controls which files make it into the catalog.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Minimum file size to include (in bytes).
    /// Files smaller than this are skipped.
    pub min_size: Option<u64>,

    /// Extension allow-list, compared case-insensitively.
    /// Entries may be given with or without the leading dot.
    /// An empty list accepts every extension.
    pub extensions: Vec<String>,
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    ///
    /// # Arguments
    ///
    /// * `min_size` - Minimum file size filter
    /// * `extensions` - Extension allow-list
    #[must_use]
    pub fn new(min_size: Option<u64>, extensions: Vec<String>) -> Self {
        Self {
            min_size,
            extensions,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_new() {
        let record = FileRecord::new("/test/file.txt", 1024);

        assert_eq!(record.path, PathBuf::from("/test/file.txt"));
        assert_eq!(record.size, 1024);
        assert_eq!(record.file_name(), "file.txt");
        assert_eq!(record.location(), "/test");
    }

    #[test]
    fn test_hashed_file_signature_accessors() {
        let digested = HashedFile::with_digest(FileRecord::new("/a.txt", 1), [7u8; 32]);
        assert!(!digested.is_image());
        assert_eq!(digested.digest(), Some(&[7u8; 32]));
        assert!(digested.fingerprint().is_none());

        let fp = Fingerprint::from_u64(0xFF);
        let fingerprinted = HashedFile::with_fingerprint(FileRecord::new("/a.png", 1), fp.clone());
        assert!(fingerprinted.is_image());
        assert_eq!(fingerprinted.fingerprint(), Some(&fp));
        assert!(fingerprinted.digest().is_none());
    }

    #[test]
    fn test_walker_config_default() {
        let config = WalkerConfig::default();

        assert!(config.min_size.is_none());
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn test_walker_config_new() {
        let config = WalkerConfig::new(Some(1024), vec![".jpg".to_string()]);

        assert_eq!(config.min_size, Some(1024));
        assert_eq!(config.extensions, vec![".jpg".to_string()]);
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::PermissionDenied(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "Permission denied: /test");

        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");
    }

    #[test]
    fn test_hash_error_display() {
        let err = HashError::NotFound(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "File not found: /test");

        let err = HashError::PermissionDenied(PathBuf::from("/secret"));
        assert_eq!(err.to_string(), "Permission denied: /secret");
    }
}
