use doppel::duplicates::{
    build_catalog, compare_catalogs, files_on_side, side_of, wasted_space, HashPhaseConfig, Side,
};
use doppel::scanner::{Hasher, WalkerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn compare(first: &Path, second: &Path) -> Vec<doppel::duplicates::DuplicateGroup> {
    let config = WalkerConfig::default();
    let (a, _) = build_catalog(first, &config, None).unwrap();
    let (b, _) = build_catalog(second, &config, None).unwrap();
    compare_catalogs(&a, &b, &Hasher::new(), &HashPhaseConfig::default()).0
}

#[test]
fn test_compare_finds_cross_tree_copy() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("photo.jpg"), b"holiday").unwrap();
    fs::write(second.path().join("backup.jpg"), b"holiday").unwrap();
    fs::write(second.path().join("other.jpg"), b"unrelated").unwrap();

    let groups = compare(first.path(), second.path());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(groups[0].files[0].file_name(), "photo.jpg");
    assert_eq!(groups[0].files[1].file_name(), "backup.jpg");
    assert!(!groups[0].is_image);
}

#[test]
fn test_compare_ignores_duplicates_within_one_tree() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("a"), b"only here").unwrap();
    fs::write(first.path().join("b"), b"only here").unwrap();
    fs::write(second.path().join("c"), b"something").unwrap();

    assert!(compare(first.path(), second.path()).is_empty());
}

#[test]
fn test_compare_size_unique_within_tree_still_matches() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    // Each tree holds a single file of this size
    fs::write(first.path().join("one"), b"lonely but shared").unwrap();
    fs::write(second.path().join("two"), b"lonely but shared").unwrap();

    assert_eq!(compare(first.path(), second.path()).len(), 1);
}

#[test]
fn test_compare_digest_consumed_by_first_match() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("orig1"), b"payload").unwrap();
    fs::write(first.path().join("orig2"), b"payload").unwrap();
    fs::write(second.path().join("copy1"), b"payload").unwrap();
    fs::write(second.path().join("copy2"), b"payload").unwrap();

    let groups = compare(first.path(), second.path());

    assert_eq!(groups.len(), 1);
    let names: Vec<String> = groups[0].files.iter().map(|f| f.file_name()).collect();
    assert_eq!(names, vec!["orig1", "orig2", "copy1"]);
    assert_eq!(groups[0].representative_size, 7);
}

#[test]
fn test_compare_wasted_space_counts_both_first_tree_copies() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("orig1"), b"payload").unwrap();
    fs::write(first.path().join("orig2"), b"payload").unwrap();
    fs::write(second.path().join("copy1"), b"payload").unwrap();

    let groups = compare(first.path(), second.path());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 3);
    assert_eq!(wasted_space(&groups), 14);
}

#[test]
fn test_compare_sides_attribution() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("a"), b"same").unwrap();
    fs::write(second.path().join("b"), b"same").unwrap();

    let groups = compare(first.path(), second.path());
    let group = &groups[0];

    let on_first = files_on_side(group, Side::First, first.path(), second.path());
    let on_second = files_on_side(group, Side::Second, first.path(), second.path());
    assert_eq!(on_first.len(), 1);
    assert_eq!(on_second.len(), 1);
    assert_eq!(
        side_of(&on_second[0].path, first.path(), second.path()),
        Some(Side::Second)
    );
}

#[test]
fn test_compare_nested_roots() {
    let outer = tempdir().unwrap();
    let inner = outer.path().join("backup");
    fs::create_dir(&inner).unwrap();
    fs::write(outer.path().join("doc.txt"), b"report").unwrap();
    fs::write(inner.join("doc.txt"), b"report").unwrap();

    assert_eq!(
        side_of(&inner.join("doc.txt"), outer.path(), &inner),
        Some(Side::Second)
    );
    assert_eq!(
        side_of(&outer.path().join("doc.txt"), outer.path(), &inner),
        Some(Side::First)
    );
}

#[test]
fn test_compare_missing_directory_is_error() {
    let first = tempdir().unwrap();
    assert!(build_catalog(&first.path().join("missing"), &WalkerConfig::default(), None).is_err());
}
