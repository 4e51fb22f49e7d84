use std::fs;
use std::path::PathBuf;

use program_export::{JsonProgramSource, ProgramSource, SourceError, VisibilityGuard};
use tempfile::TempDir;

fn document_path(dir: &TempDir) -> PathBuf {
    dir.path().join("acme2024.json")
}

fn write_document(dir: &TempDir, schedule_public: bool) -> JsonProgramSource {
    let path = document_path(dir);
    let document = serde_json::json!({
        "acronym": "acme2024",
        "program_export_base_url": "https://static.example.org/acme2024",
        "schedule_public": schedule_public,
        "revision": 3,
        "days": [],
        "events": [],
        "people": []
    });
    fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();
    JsonProgramSource::new(path)
}

#[test]
fn snapshot_reads_the_conference() {
    let temp = TempDir::new().unwrap();
    let source = write_document(&temp, false);

    let snapshot = source.snapshot().unwrap();

    assert_eq!(snapshot.acronym, "acme2024");
    assert_eq!(
        snapshot.program_export_base_url.as_deref(),
        Some("https://static.example.org/acme2024")
    );
    assert!(!source.schedule_public().unwrap());
}

#[test]
fn writes_outside_critical_section_are_recorded() {
    let temp = TempDir::new().unwrap();
    let source = write_document(&temp, false);

    source.set_schedule_public(true).unwrap();

    assert!(source.schedule_public().unwrap());
    assert_eq!(source.revision().unwrap(), 4);
}

#[test]
fn writes_inside_critical_section_are_not_recorded() {
    let temp = TempDir::new().unwrap();
    let source = write_document(&temp, false);

    source.begin_critical_section().unwrap();
    source.set_schedule_public(true).unwrap();
    source.set_schedule_public(false).unwrap();
    source.end_critical_section().unwrap();

    assert_eq!(source.revision().unwrap(), 3);
}

#[test]
fn critical_sections_do_not_nest() {
    let temp = TempDir::new().unwrap();
    let source = write_document(&temp, false);

    source.begin_critical_section().unwrap();

    assert!(matches!(
        source.begin_critical_section(),
        Err(SourceError::AlreadyInCriticalSection)
    ));
    source.end_critical_section().unwrap();
    assert!(matches!(
        source.end_critical_section(),
        Err(SourceError::NotInCriticalSection)
    ));
}

#[test]
fn guard_forces_draft_schedule_public_and_restores_it() {
    let temp = TempDir::new().unwrap();
    let source = write_document(&temp, false);

    let guard = VisibilityGuard::acquire(&source).unwrap();
    assert!(guard.forced());
    assert!(!guard.original());
    assert!(source.schedule_public().unwrap());

    guard.release().unwrap();
    assert!(!source.schedule_public().unwrap());
    assert_eq!(source.revision().unwrap(), 3);
}

#[test]
fn guard_leaves_public_schedule_untouched() {
    let temp = TempDir::new().unwrap();
    let source = write_document(&temp, true);
    let before = fs::read(document_path(&temp)).unwrap();

    let guard = VisibilityGuard::acquire(&source).unwrap();
    assert!(!guard.forced());
    guard.release().unwrap();

    assert_eq!(fs::read(document_path(&temp)).unwrap(), before);
}

#[test]
fn dropped_guard_restores_visibility() {
    let temp = TempDir::new().unwrap();
    let source = write_document(&temp, false);

    {
        let _guard = VisibilityGuard::acquire(&source).unwrap();
        assert!(source.schedule_public().unwrap());
    }

    assert!(!source.schedule_public().unwrap());
    source.begin_critical_section().unwrap();
}
