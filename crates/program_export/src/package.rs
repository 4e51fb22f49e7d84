use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use thiserror::Error;

pub const SCHEDULE_PAGE: &str = "schedule.html";
pub const INDEX_PAGE: &str = "index.html";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("export directory {0:?} does not exist")]
    MissingDirectory(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Copy `schedule.html` to `index.html` so the export works as a web root.
///
/// Returns whether an index page was created.
pub fn create_index_page(export_dir: &Path) -> io::Result<bool> {
    let schedule = export_dir.join(SCHEDULE_PAGE);
    if !schedule.is_file() {
        return Ok(false);
    }
    fs::copy(&schedule, export_dir.join(INDEX_PAGE))?;
    Ok(true)
}

/// Path of the archive for a conference export.
pub fn archive_path(export_root: &Path, acronym: &str) -> PathBuf {
    export_root.join(format!("{acronym}.tar.gz"))
}

/// Pack `{export_root}/{acronym}` into `{export_root}/{acronym}.tar.gz`.
///
/// The archive's only top-level entry is the `{acronym}` directory. A previous
/// archive is removed first, so re-running replaces it.
pub fn create_archive(export_root: &Path, acronym: &str) -> Result<PathBuf, ArchiveError> {
    let out_file = archive_path(export_root, acronym);
    match fs::remove_file(&out_file) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    let source_dir = export_root.join(acronym);
    if !source_dir.is_dir() {
        return Err(ArchiveError::MissingDirectory(source_dir));
    }

    let tmp = NamedTempFile::new_in(export_root)?;
    let mut builder = tar::Builder::new(GzEncoder::new(tmp, Compression::default()));
    builder.follow_symlinks(false);
    builder.append_dir_all(acronym, &source_dir)?;
    let tmp = builder.into_inner()?.finish()?;
    tmp.as_file().sync_all()?;
    tmp.persist(&out_file).map_err(|e| ArchiveError::Io(e.error))?;
    Ok(out_file)
}
