use std::fs;
use std::sync::Mutex;

use program_core::AssetPathSet;
use program_export::{AssetCopier, AssetCopyReport, ExportEvent, ExportEventSink};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ExportEvent>>,
}

impl ExportEventSink for RecordingSink {
    fn emit(&self, event: ExportEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn setup() -> (TempDir, AssetCopier) {
    let temp = TempDir::new().unwrap();
    let asset_root = temp.path().join("public");
    fs::create_dir_all(asset_root.join("images")).unwrap();
    fs::write(asset_root.join("images").join("logo.png"), b"png").unwrap();
    fs::write(asset_root.join("images").join("two words.png"), b"spaced").unwrap();
    fs::write(temp.path().join("secret.txt"), b"secret").unwrap();
    let copier = AssetCopier::new(asset_root, temp.path().join("export").join("acme2024"));
    (temp, copier)
}

#[test]
fn assets_are_mirrored_into_the_export_tree() {
    let (temp, copier) = setup();
    let mut assets = AssetPathSet::new();
    assets.insert("images/logo.png");
    let sink = RecordingSink::default();

    let report = copier.copy_all(&assets, &sink).unwrap();

    assert_eq!(report, AssetCopyReport { copied: 1, missing: 0 });
    let copied = temp.path().join("export/acme2024/images/logo.png");
    assert_eq!(fs::read(copied).unwrap(), b"png");
}

#[test]
fn percent_encoded_paths_are_decoded() {
    let (temp, copier) = setup();
    let mut assets = AssetPathSet::new();
    assets.insert("images/two%20words.png");
    let sink = RecordingSink::default();

    let report = copier.copy_all(&assets, &sink).unwrap();

    assert_eq!(report.copied, 1);
    assert!(temp.path().join("export/acme2024/images/two words.png").is_file());
}

#[test]
fn missing_assets_are_reported_and_skipped() {
    let (temp, copier) = setup();
    let mut assets = AssetPathSet::new();
    assets.insert("images/missing.png");
    assets.insert("images/logo.png");
    let sink = RecordingSink::default();

    let report = copier.copy_all(&assets, &sink).unwrap();

    assert_eq!(report, AssetCopyReport { copied: 1, missing: 1 });
    let events = sink.events.lock().unwrap();
    assert!(events.contains(&ExportEvent::AssetMissing {
        path: temp.path().join("public").join("images").join("missing.png"),
    }));
}

#[test]
fn paths_leaving_the_asset_root_are_refused() {
    let (temp, copier) = setup();
    let mut assets = AssetPathSet::new();
    assets.insert("../secret.txt");
    let sink = RecordingSink::default();

    let report = copier.copy_all(&assets, &sink).unwrap();

    assert_eq!(report, AssetCopyReport { copied: 0, missing: 1 });
    assert!(!temp.path().join("export").join("secret.txt").exists());
}
