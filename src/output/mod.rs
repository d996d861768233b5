//! Output formatters for duplicate reports.
//!
//! This module provides different output formats for scan results:
//! - Table for interactive terminal use (default)
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use doppel::duplicates::DuplicateFinder;
//! use doppel::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, _) = finder.scan_directory(Path::new("."), &Default::default()).unwrap();
//!
//! let output = JsonOutput::new(&groups);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod table;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use csv::CsvOutput;
pub use json::{GroupKind, JsonOutput};

/// Report format selected with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned tables with interactive prompts
    #[default]
    Table,
    /// Machine-readable JSON; never prompts or deletes
    Json,
    /// One CSV row per file; never prompts or deletes
    Csv,
}

impl OutputFormat {
    /// Whether this format is meant for machines (no prompts, no bars).
    #[must_use]
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, Self::Table)
    }
}
