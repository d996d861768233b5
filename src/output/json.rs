//! JSON output formatter for duplicate reports.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "key": "abc123...",
//!       "kind": "exact",
//!       "similarity_percent": 100,
//!       "size": 1024,
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "wasted_space": 1024,
//!   "group_count": 1
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{wasted_space, DuplicateGroup};

/// How a group was formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Identical content digest
    Exact,
    /// Perceptually similar images
    Similar,
}

impl GroupKind {
    /// Kind of an existing group.
    #[must_use]
    pub fn of(group: &DuplicateGroup) -> Self {
        if group.is_image {
            Self::Similar
        } else {
            Self::Exact
        }
    }

    /// Lowercase label used in JSON and CSV.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Similar => "similar",
        }
    }
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Hex digest, or seed fingerprint for similar-image groups
    pub key: String,
    /// Exact or similar
    pub kind: GroupKind,
    /// 100 for exact groups
    pub similarity_percent: u8,
    /// Representative size in bytes
    pub size: u64,
    /// Paths of all members, representative first
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            key: group.key.clone(),
            kind: GroupKind::of(group),
            similarity_percent: group.similarity_percent,
            size: group.representative_size,
            files: group
                .files
                .iter()
                .map(|f| f.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub groups: Vec<JsonDuplicateGroup>,
    /// Total reclaimable bytes
    pub wasted_space: u64,
    /// Number of groups
    pub group_count: usize,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate groups.
    ///
    /// # Example
    ///
    /// ```
    /// use doppel::duplicates::DuplicateGroup;
    /// use doppel::output::json::JsonOutput;
    /// use doppel::scanner::FileRecord;
    ///
    /// let groups = vec![DuplicateGroup::exact(
    ///     &[0u8; 32],
    ///     vec![FileRecord::new("/file1.txt", 1024), FileRecord::new("/file2.txt", 1024)],
    /// )];
    ///
    /// let output = JsonOutput::new(&groups);
    /// assert_eq!(output.group_count, 1);
    /// assert_eq!(output.wasted_space, 1024);
    /// ```
    #[must_use]
    pub fn new(groups: &[DuplicateGroup]) -> Self {
        Self {
            groups: groups.iter().map(JsonDuplicateGroup::from).collect(),
            wasted_space: wasted_space(groups),
            group_count: groups.len(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
