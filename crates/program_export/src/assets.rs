use std::fs;
use std::path::PathBuf;

use program_core::AssetPathSet;

use crate::persist::{safe_join, PersistError};
use crate::{ExportEvent, ExportEventSink};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCopyReport {
    pub copied: usize,
    pub missing: usize,
}

/// Mirrors discovered assets from the live asset root into an export directory.
#[derive(Debug, Clone)]
pub struct AssetCopier {
    asset_root: PathBuf,
    export_dir: PathBuf,
}

impl AssetCopier {
    pub fn new(asset_root: PathBuf, export_dir: PathBuf) -> Self {
        Self {
            asset_root,
            export_dir,
        }
    }

    /// Copy every asset; missing or unresolvable ones are reported and skipped.
    ///
    /// Only failures writing into the export directory are errors.
    pub fn copy_all(
        &self,
        assets: &AssetPathSet,
        sink: &dyn ExportEventSink,
    ) -> Result<AssetCopyReport, PersistError> {
        let mut report = AssetCopyReport::default();
        for asset in assets.iter() {
            let Ok(relative) = urlencoding::decode(asset) else {
                report.missing += 1;
                sink.emit(ExportEvent::AssetMissing {
                    path: self.asset_root.join(asset),
                });
                continue;
            };

            let resolved = safe_join(&self.asset_root, &relative)
                .zip(safe_join(&self.export_dir, &relative));
            let (source, target) = match resolved {
                Some((source, target)) if source.is_file() => (source, target),
                Some((source, _)) => {
                    report.missing += 1;
                    sink.emit(ExportEvent::AssetMissing { path: source });
                    continue;
                }
                None => {
                    report.missing += 1;
                    sink.emit(ExportEvent::AssetMissing {
                        path: self.asset_root.join(&*relative),
                    });
                    continue;
                }
            };

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&source, &target)?;
            report.copied += 1;
            sink.emit(ExportEvent::AssetCopied {
                path: asset.to_string(),
            });
        }
        Ok(report)
    }
}
