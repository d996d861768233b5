use doppel::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use doppel::scanner::WalkerConfig;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn write_file(dir: &std::path::Path, name: &str, content: &[u8]) {
    File::create(dir.join(name))
        .unwrap()
        .write_all(content)
        .unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder
        .scan_directory(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups(), 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"content a");
    write_file(dir.path(), "b.txt", b"content b");
    write_file(dir.path(), "c.txt", b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .scan_directory(dir.path(), &WalkerConfig::default())
        .unwrap();

    // Same size, different content: hashed but never grouped
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.hashed_files, 3);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"duplicate");
    write_file(dir.path(), "b.txt", b"duplicate");
    write_file(dir.path(), "c.txt", b"unique");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .scan_directory(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert!(!groups[0].is_image);
    assert_eq!(groups[0].similarity_percent, 100);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 9);
}

#[test]
fn test_scan_nested_directories_in_walk_order() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("b/deep")).unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    write_file(&dir.path().join("b/deep"), "x.bin", b"same bytes");
    write_file(&dir.path().join("a"), "y.bin", b"same bytes");
    write_file(dir.path(), "z.bin", b"same bytes");

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder
        .scan_directory(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert_eq!(groups.len(), 1);
    let names: Vec<String> = groups[0].files.iter().map(|f| f.file_name()).collect();
    assert_eq!(names.len(), 3);
    // Catalog order is name-sorted per directory, so a/ comes before b/
    let pos_y = names.iter().position(|n| n == "y.bin").unwrap();
    let pos_x = names.iter().position(|n| n == "x.bin").unwrap();
    assert!(pos_y < pos_x);
}

#[test]
fn test_scan_groups_ordered_by_first_occurrence() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "1.dat", b"bbbb");
    write_file(dir.path(), "2.dat", b"aa");
    write_file(dir.path(), "3.dat", b"aa");
    write_file(dir.path(), "4.dat", b"bbbb");

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder
        .scan_directory(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].files[0].file_name(), "1.dat");
    assert_eq!(groups[1].files[0].file_name(), "2.dat");
}

#[test]
fn test_scan_min_size_filter() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "small1", b"ab");
    write_file(dir.path(), "small2", b"ab");
    write_file(dir.path(), "big1", &[1u8; 2048]);
    write_file(dir.path(), "big2", &[1u8; 2048]);

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .scan_directory(dir.path(), &WalkerConfig::new(Some(1024), Vec::new()))
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].representative_size, 2048);
}

#[test]
fn test_scan_extension_filter() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.log", b"entry");
    write_file(dir.path(), "b.LOG", b"entry");
    write_file(dir.path(), "c.txt", b"entry");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .scan_directory(dir.path(), &WalkerConfig::new(None, vec![".log".to_string()]))
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.iter().all(|f| f.file_name() != "c.txt"));
}

#[test]
fn test_scan_skips_empty_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "empty1", b"");
    write_file(dir.path(), "empty2", b"");

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder
        .scan_directory(dir.path(), &WalkerConfig::default())
        .unwrap();

    assert!(groups.is_empty());
}

#[test]
fn test_scan_missing_root_is_error() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let result = finder.scan_directory(&dir.path().join("nope"), &WalkerConfig::default());
    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_scan_file_root_is_error() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "file.txt", b"x");
    let finder = DuplicateFinder::with_defaults();

    let result = finder.scan_directory(&dir.path().join("file.txt"), &WalkerConfig::default());
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}

#[test]
fn test_scan_single_io_thread_matches_default() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write_file(dir.path(), &format!("{i}.bin"), format!("group{}", i % 2).as_bytes());
    }

    let parallel = DuplicateFinder::with_defaults()
        .scan_directory(dir.path(), &WalkerConfig::default())
        .unwrap()
        .0;
    let serial = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .scan_directory(dir.path(), &WalkerConfig::default())
        .unwrap()
        .0;

    assert_eq!(parallel, serial);
    assert_eq!(parallel.len(), 2);
}
