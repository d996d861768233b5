//! File actions module.
//!
//! This module provides functionality for:
//! - Safe deletion via trash crate
//! - Permanent deletion (with `--permanent`)
//!
//! ```no_run
//! use doppel::actions::delete::delete_to_trash;
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/duplicate.txt");
//! let result = delete_to_trash(&path);
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_all_except, delete_batch, delete_file, delete_to_trash, permanent_delete,
    validate_preserves_copy, BatchDeleteResult, DeleteConfig, DeleteError, DeleteResult,
};
