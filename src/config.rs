//! Application configuration management.
//!
//! Settings are layered with `figment`, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory (or `--config PATH`)
//! 3. `DOPPEL_*` environment variables (e.g. `DOPPEL_THRESHOLD=8`)
//! 4. Command-line flags
//!
//! # Example
//!
//! ```toml
//! threshold = 8
//! algorithm = "phash"
//! min_size = 4096
//! extensions = [".jpg", ".png"]
//! io_threads = 2
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{CommonArgs, CompareArgs, ScanArgs};
use crate::duplicates::{DEFAULT_IMAGE_THRESHOLD, DEFAULT_IO_THREADS};
use crate::output::OutputFormat;
use crate::scanner::{PerceptualAlgorithm, WalkerConfig};

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "DOPPEL_";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file or environment could not be parsed.
    #[error("invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The similarity threshold exceeds the fingerprint length.
    #[error("threshold {threshold} exceeds the {max}-bit fingerprint length")]
    ThresholdOutOfRange {
        /// Configured threshold
        threshold: u32,
        /// Fingerprint bit length of the selected algorithm
        max: u32,
    },

    /// Hashing needs at least one thread.
    #[error("io_threads must be at least 1")]
    ZeroIoThreads,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum perceptual distance for similar images.
    pub threshold: u32,
    /// Send images through exact hashing instead of perceptual hashing.
    pub exact: bool,
    /// Perceptual hash algorithm.
    pub algorithm: PerceptualAlgorithm,
    /// Skip files smaller than this many bytes.
    pub min_size: Option<u64>,
    /// Extension allow-list; empty accepts everything.
    pub extensions: Vec<String>,
    /// Number of I/O threads for hashing.
    pub io_threads: usize,
    /// Delete permanently instead of moving to trash.
    pub permanent: bool,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_IMAGE_THRESHOLD,
            exact: false,
            algorithm: PerceptualAlgorithm::default(),
            min_size: None,
            extensions: Vec::new(),
            io_threads: DEFAULT_IO_THREADS,
            permanent: false,
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "doppel", "doppel").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location, falling back to defaults on error.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::debug!("No config directory available, using defaults");
            return Self::default();
        };

        match Self::try_load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load from a specific file, falling back to defaults on error.
    ///
    /// A missing file is not an error; defaults and environment apply.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load from a specific file plus `DOPPEL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file or environment holds values
    /// of the wrong type.
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading config from {}", path.display());
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Overlay the flags shared by both subcommands.
    pub fn merge_common_args(&mut self, args: &CommonArgs) {
        if let Some(min_size) = args.min_size {
            self.min_size = Some(min_size);
        }
        if !args.extensions.is_empty() {
            self.extensions.clone_from(&args.extensions);
        }
        if let Some(threads) = args.io_threads {
            self.io_threads = threads;
        }
        if args.permanent {
            self.permanent = true;
        }
        if let Some(output) = args.output {
            self.output = output;
        }
    }

    /// Overlay `scan` flags; omitted flags keep the configured value.
    pub fn merge_scan_args(&mut self, args: &ScanArgs) {
        self.merge_common_args(&args.common);
        if args.exact {
            self.exact = true;
        } else if args.no_exact {
            self.exact = false;
        }
        if let Some(threshold) = args.threshold {
            self.threshold = threshold;
        }
        if let Some(algorithm) = args.algorithm {
            self.algorithm = algorithm;
        }
    }

    /// Overlay `compare` flags. Comparison is always exact.
    pub fn merge_compare_args(&mut self, args: &CompareArgs) {
        self.merge_common_args(&args.common);
        self.exact = true;
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a threshold above the fingerprint length
    /// or zero I/O threads.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = self.algorithm.bits();
        if self.threshold > max {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.threshold,
                max,
            });
        }
        if self.io_threads == 0 {
            return Err(ConfigError::ZeroIoThreads);
        }
        Ok(())
    }

    /// Walker filters derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.min_size, self.extensions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::sync::Mutex;
    use tempfile::tempdir;

    use crate::cli::{Cli, Commands};

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Clear all DOPPEL_* environment variables to avoid interference.
    fn clear_env() {
        for (key, _) in std::env::vars() {
            if key.starts_with(ENV_PREFIX) {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.threshold, 5);
        assert!(!config.exact);
        assert_eq!(config.algorithm, PerceptualAlgorithm::Dhash);
        assert_eq!(config.io_threads, 4);
        assert!(config.extensions.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_toml() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
threshold = 9
algorithm = "ahash"
min_size = 4096
extensions = [".jpg"]
io_threads = 2
output = "json"
"#,
        )
        .unwrap();

        let config = Config::try_load_from_path(&path).unwrap();

        assert_eq!(config.threshold, 9);
        assert_eq!(config.algorithm, PerceptualAlgorithm::Ahash);
        assert_eq!(config.min_size, Some(4096));
        assert_eq!(config.extensions, vec![".jpg".to_string()]);
        assert_eq!(config.io_threads, 2);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(!config.permanent);
    }

    #[test]
    fn test_config_missing_file_uses_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();

        let config = Config::load_from_path(dir.path().join("nonexistent.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_bad_type_is_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "threshold = \"lots\"\n").unwrap();

        assert!(matches!(
            Config::try_load_from_path(&path),
            Err(ConfigError::Load(_))
        ));
        assert_eq!(Config::load_from_path(&path), Config::default());
    }

    #[test]
    fn test_config_hierarchy_file_env_cli() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "threshold = 8\nio_threads = 8\n").unwrap();

        // Environment overrides the file
        std::env::set_var("DOPPEL_THRESHOLD", "12");
        let mut config = Config::try_load_from_path(&path).unwrap();
        clear_env();
        assert_eq!(config.threshold, 12);
        assert_eq!(config.io_threads, 8);

        // CLI overrides the environment, omitted flags keep their values
        let cli = Cli::try_parse_from(["doppel", "scan", ".", "--threshold", "3"]).unwrap();
        if let Commands::Scan(args) = &cli.command {
            config.merge_scan_args(args);
        }
        assert_eq!(config.threshold, 3);
        assert_eq!(config.io_threads, 8);
    }

    #[test]
    fn test_no_exact_flag_overrides_file_and_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "exact = true\n").unwrap();

        std::env::set_var("DOPPEL_EXACT", "true");
        let mut config = Config::try_load_from_path(&path).unwrap();
        clear_env();
        assert!(config.exact);

        // Without either flag the loaded value stands
        let cli = Cli::try_parse_from(["doppel", "scan", "."]).unwrap();
        if let Commands::Scan(args) = &cli.command {
            config.merge_scan_args(args);
        }
        assert!(config.exact);

        let cli = Cli::try_parse_from(["doppel", "scan", ".", "--no-exact"]).unwrap();
        if let Commands::Scan(args) = &cli.command {
            config.merge_scan_args(args);
        }
        assert!(!config.exact);
    }

    #[test]
    fn test_merge_compare_forces_exact() {
        let mut config = Config::default();
        let cli = Cli::try_parse_from(["doppel", "compare", "/a", "/b", "--min-size", "1KB"]).unwrap();
        if let Commands::Compare(args) = &cli.command {
            config.merge_compare_args(args);
        }

        assert!(config.exact);
        assert_eq!(config.min_size, Some(1000));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = Config {
            threshold: 65,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange { threshold: 65, max: 64 })
        ));

        let config = Config {
            io_threads: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroIoThreads)));
    }

    #[test]
    fn test_walker_config() {
        let config = Config {
            min_size: Some(10),
            extensions: vec!["png".to_string()],
            ..Config::default()
        };
        let walker = config.walker_config();
        assert_eq!(walker.min_size, Some(10));
        assert_eq!(walker.extensions, vec!["png".to_string()]);
    }
}
