use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_scan_fingerprints_each_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("20120101000000-b.sql"), "hello\n").unwrap();
    fs::write(dir.path().join("20110101000000-a.sql"), "").unwrap();

    let records = scan_directory(dir.path()).unwrap();

    assert_eq!(
        records,
        vec![
            MigrationRecord::new(
                "20110101000000-a.sql",
                "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
            ),
            MigrationRecord::new(
                "20120101000000-b.sql",
                "ce013625030ba8dba906f756967f9e9ca394464a"
            ),
        ]
    );
}

#[test]
fn test_scan_is_deterministic() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("001.sql"), "CREATE TABLE t (id int);").unwrap();

    let first = scan_directory(dir.path()).unwrap();
    let second = scan_directory(dir.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_scan_hash_independent_of_filename() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("001-one.sql"), "SELECT 1;").unwrap();
    fs::write(dir.path().join("002-two.sql"), "SELECT 1;").unwrap();

    let records = scan_directory(dir.path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].content_hash, records[1].content_hash);
}

#[test]
fn test_scan_skips_hidden_files_and_directories() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".gitkeep"), "").unwrap();
    fs::create_dir(dir.path().join("archive")).unwrap();
    fs::write(dir.path().join("archive").join("old.sql"), "SELECT 1;").unwrap();
    fs::write(dir.path().join("001.sql"), "SELECT 1;").unwrap();

    let records = scan_directory(dir.path()).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["001.sql"]);
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    assert!(scan_directory(dir.path()).unwrap().is_empty());
}

#[test]
fn test_scan_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = scan_directory(&missing).unwrap_err();
    assert!(matches!(err, CoreError::IoWithPath { .. }));
    assert!(err.to_string().contains("nope"));
}
