//! CSV output formatter for duplicate reports.
//!
//! One row is generated for each file of each group.
//!
//! # Columns
//!
//! - `group_id`: 1-based group number
//! - `kind`: `exact` or `similar`
//! - `similarity`: similarity percentage (100 for exact groups)
//! - `key`: content digest or seed fingerprint (hexadecimal)
//! - `path`: path to the file
//! - `size`: file size in bytes

use std::io;

use serde::Serialize;
use thiserror::Error;

use super::json::GroupKind;
use crate::duplicates::DuplicateGroup;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    kind: &'static str,
    similarity: u8,
    key: &'a str,
    path: String,
    size: u64,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            let kind = GroupKind::of(group).as_str();
            for file in &group.files {
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    kind,
                    similarity: group.similarity_percent,
                    key: &group.key,
                    path: file.path.to_string_lossy().into_owned(),
                    size: file.size,
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
