use clap::Parser;
use doppel::cli::Cli;
use doppel::error::ExitCode;
use doppel::run_app;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// An empty config file so the user's own configuration never leaks in.
fn isolated_config() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();
    dir
}

fn run(args: &[&str], config_dir: &Path) -> anyhow::Result<ExitCode> {
    let config = config_dir.join("config.toml");
    let mut argv = vec!["doppel", "--quiet", "--no-color", "--config"];
    argv.push(config.to_str().unwrap());
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_scan_no_duplicates_exit_code() {
    let config = isolated_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"one").unwrap();
    fs::write(dir.path().join("b"), b"two!").unwrap();

    let code = run(&["scan", dir.path().to_str().unwrap(), "--dry-run"], config.path()).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_scan_json_output_success() {
    let config = isolated_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"copy").unwrap();
    fs::write(dir.path().join("b"), b"copy").unwrap();

    let code = run(
        &["scan", dir.path().to_str().unwrap(), "--output", "json"],
        config.path(),
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    // Machine-readable output never deletes
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("b").exists());
}

#[test]
fn test_scan_auto_delete_permanent() {
    let config = isolated_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"copy").unwrap();
    fs::write(dir.path().join("b"), b"copy").unwrap();

    let code = run(
        &[
            "scan",
            dir.path().to_str().unwrap(),
            "--auto-delete",
            "--permanent",
        ],
        config.path(),
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a").exists());
    assert!(!dir.path().join("b").exists());
}

#[test]
fn test_scan_missing_path_is_error() {
    let config = isolated_config();
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let result = run(&["scan", missing.to_str().unwrap(), "--dry-run"], config.path());
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Path not found"));
}

#[test]
fn test_compare_delete_from_second() {
    let config = isolated_config();
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("keep.txt"), b"shared").unwrap();
    fs::write(second.path().join("drop.txt"), b"shared").unwrap();

    let code = run(
        &[
            "compare",
            first.path().to_str().unwrap(),
            second.path().to_str().unwrap(),
            "--delete-from-2",
            "--permanent",
        ],
        config.path(),
    )
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(first.path().join("keep.txt").exists());
    assert!(!second.path().join("drop.txt").exists());
}

#[test]
fn test_compare_nothing_shared() {
    let config = isolated_config();
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("a"), b"left").unwrap();
    fs::write(second.path().join("b"), b"right").unwrap();

    let code = run(
        &[
            "compare",
            first.path().to_str().unwrap(),
            second.path().to_str().unwrap(),
            "--dry-run",
        ],
        config.path(),
    )
    .unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_invalid_config_file_is_error() {
    let config = tempdir().unwrap();
    fs::write(config.path().join("config.toml"), "io_threads = \"many\"\n").unwrap();
    let dir = tempdir().unwrap();

    assert!(run(&["scan", dir.path().to_str().unwrap(), "--dry-run"], config.path()).is_err());
}

#[test]
fn test_zero_io_threads_rejected() {
    let config = isolated_config();
    let dir = tempdir().unwrap();

    let result = run(
        &["scan", dir.path().to_str().unwrap(), "--io-threads", "0", "--dry-run"],
        config.path(),
    );
    assert!(result.is_err());
}
