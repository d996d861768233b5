//! doppel - duplicate and near-duplicate file finder
//!
//! Finds byte-identical files by BLAKE3 content hash and visually similar
//! images by perceptual hash, then helps decide which copies to delete.
//!
//! The engine lives in [`duplicates`]; [`scanner`] builds catalogs and
//! computes digests and fingerprints; [`actions`] and [`output`] form the
//! presentation layer used by the `doppel` binary.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

pub use app::run_app;
