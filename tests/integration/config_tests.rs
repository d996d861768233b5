use doppel::config::{Config, ConfigError};
use doppel::output::OutputFormat;
use doppel::scanner::PerceptualAlgorithm;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_load_full_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
threshold = 12
exact = true
algorithm = "phash"
extensions = ["png", ".jpg"]
permanent = true
output = "csv"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path);

    assert_eq!(config.threshold, 12);
    assert!(config.exact);
    assert_eq!(config.algorithm, PerceptualAlgorithm::Phash);
    assert_eq!(config.extensions.len(), 2);
    assert!(config.permanent);
    assert_eq!(config.output, OutputFormat::Csv);
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "min_size = 100\n").unwrap();

    let config = Config::load_from_path(&path);

    assert_eq!(config.min_size, Some(100));
    assert_eq!(config.threshold, 5);
    assert_eq!(config.walker_config().min_size, Some(100));
}

#[test]
fn test_unknown_algorithm_is_load_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "algorithm = \"sha1\"\n").unwrap();

    assert!(matches!(
        Config::try_load_from_path(&path),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_out_of_range_threshold_fails_validation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threshold = 100\n").unwrap();

    let config = Config::load_from_path(&path);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ThresholdOutOfRange { .. })
    ));
}
