use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::Path;

use flate2::read::GzDecoder;
use pretty_assertions::assert_eq;
use program_export::{archive_path, create_archive, create_index_page, ArchiveError};
use tempfile::TempDir;

fn archive_entries(path: &Path) -> BTreeSet<String> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            entry
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string()
        })
        .collect()
}

#[test]
fn index_page_duplicates_schedule() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("schedule.html"), "<html>schedule</html>").unwrap();

    assert!(create_index_page(temp.path()).unwrap());

    assert_eq!(
        fs::read_to_string(temp.path().join("index.html")).unwrap(),
        "<html>schedule</html>"
    );
}

#[test]
fn index_page_is_not_created_without_schedule() {
    let temp = TempDir::new().unwrap();

    assert!(!create_index_page(temp.path()).unwrap());

    assert!(!temp.path().join("index.html").exists());
}

#[test]
fn archive_is_rooted_at_the_conference_directory() {
    let temp = TempDir::new().unwrap();
    let export_dir = temp.path().join("acme2024");
    fs::create_dir_all(export_dir.join("schedule")).unwrap();
    fs::write(export_dir.join("schedule.html"), "s").unwrap();
    fs::write(export_dir.join("schedule").join("0.html"), "d").unwrap();

    let archive = create_archive(temp.path(), "acme2024").unwrap();

    assert_eq!(archive, archive_path(temp.path(), "acme2024"));
    assert_eq!(archive.file_name().unwrap(), "acme2024.tar.gz");
    let entries = archive_entries(&archive);
    assert!(entries.iter().all(|entry| entry.starts_with("acme2024")));
    assert!(entries.contains("acme2024/schedule.html"));
    assert!(entries.contains("acme2024/schedule/0.html"));
}

#[test]
fn archive_replaces_previous_archive() {
    let temp = TempDir::new().unwrap();
    let export_dir = temp.path().join("acme2024");
    fs::create_dir_all(&export_dir).unwrap();
    fs::write(export_dir.join("old.html"), "old").unwrap();
    create_archive(temp.path(), "acme2024").unwrap();

    fs::remove_file(export_dir.join("old.html")).unwrap();
    fs::write(export_dir.join("new.html"), "new").unwrap();
    let archive = create_archive(temp.path(), "acme2024").unwrap();

    let entries = archive_entries(&archive);
    assert!(entries.contains("acme2024/new.html"));
    assert!(!entries.contains("acme2024/old.html"));
}

#[test]
fn archive_requires_export_directory() {
    let temp = TempDir::new().unwrap();

    let err = create_archive(temp.path(), "missing").unwrap_err();

    assert!(matches!(err, ArchiveError::MissingDirectory(_)));
    assert!(!archive_path(temp.path(), "missing").exists());
}
