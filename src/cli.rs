//! Command-line interface definitions for doppel.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! The CLI follows standard conventions with global options (verbosity, color) and
//! subcommands for different operations.
//!
//! Options that also exist in the configuration file are optional here so
//! that an omitted flag leaves the configured value in place.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and decide per group which file to keep
//! doppel scan ~/Pictures
//!
//! # Show what would be found without deleting anything
//! doppel scan ~/Pictures --dry-run --threshold 8
//!
//! # Byte-identical files only, as JSON
//! doppel scan ~/Downloads --exact --output json
//!
//! # Files present in both trees
//! doppel compare ~/Pictures /mnt/backup/Pictures --delete-from-2
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::scanner::PerceptualAlgorithm;

/// Duplicate and near-duplicate file finder.
///
/// doppel finds byte-identical files by BLAKE3 content hash and visually
/// similar images by perceptual hash, then lets you keep one copy and move
/// the rest to the trash.
#[derive(Debug, Parser)]
#[command(name = "doppel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for doppel.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find duplicates and similar images inside one directory
    Scan(ScanArgs),
    /// Find files duplicated between two directories
    Compare(CompareArgs),
}

/// Filters and deletion options shared by both subcommands.
#[derive(Debug, Args, Clone, Default)]
pub struct CommonArgs {
    /// Show results only, never delete
    #[arg(long)]
    pub dry_run: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Only consider these extensions (e.g., .jpg,.png)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Use permanent deletion instead of moving to trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub permanent: bool,

    /// Output format (table prompts interactively, json/csv never delete)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Keep the first file of every group and delete the rest without asking
    #[arg(long, conflicts_with = "dry_run")]
    pub auto_delete: bool,

    /// List every group first, then ask once before deleting
    #[arg(long, conflicts_with = "auto_delete")]
    pub show_all: bool,

    /// Compare images byte-for-byte instead of perceptually
    #[arg(long)]
    pub exact: bool,

    /// Compare images perceptually even if config or environment sets exact
    #[arg(long, conflicts_with = "exact")]
    pub no_exact: bool,

    /// Maximum perceptual distance for similar images (0-64, lower = stricter)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(0..=64))]
    pub threshold: Option<u32>,

    /// Perceptual hash algorithm for images
    #[arg(long, value_enum)]
    pub algorithm: Option<PerceptualAlgorithm>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the compare subcommand.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// First directory
    #[arg(value_name = "DIR1")]
    pub first: PathBuf,

    /// Second directory
    #[arg(value_name = "DIR2")]
    pub second: PathBuf,

    /// Delete the copies found in DIR1 without asking
    #[arg(long = "delete-from-1", conflicts_with_all = ["delete_from_2", "dry_run"])]
    pub delete_from_1: bool,

    /// Delete the copies found in DIR2 without asking
    #[arg(long = "delete-from-2", conflicts_with = "dry_run")]
    pub delete_from_2: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use doppel::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
