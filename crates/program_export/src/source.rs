use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use export_logging::{export_error, export_warn};
use program_core::ConferenceSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid program document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("a visibility critical section is already active")]
    AlreadyInCriticalSection,
    #[error("no visibility critical section is active")]
    NotInCriticalSection,
    #[error("program source unavailable: {0}")]
    Unavailable(String),
}

/// Conference data as seen by the exporter: read-only program data plus the
/// single mutable "schedule is public" flag.
pub trait ProgramSource: Send + Sync {
    fn snapshot(&self) -> Result<ConferenceSnapshot, SourceError>;

    fn schedule_public(&self) -> Result<bool, SourceError>;

    /// Start a section in which visibility writes are not recorded as edits.
    fn begin_critical_section(&self) -> Result<(), SourceError>;

    fn set_schedule_public(&self, public: bool) -> Result<(), SourceError>;

    fn end_critical_section(&self) -> Result<(), SourceError>;
}

/// Scoped ownership of the visibility flag for one export run.
///
/// `acquire` forces a draft schedule public; `release` puts the original value
/// back exactly once. Dropping an unreleased guard restores as well.
pub struct VisibilityGuard<'a> {
    source: &'a dyn ProgramSource,
    original: bool,
    forced: bool,
    released: bool,
}

impl<'a> VisibilityGuard<'a> {
    pub fn acquire(source: &'a dyn ProgramSource) -> Result<Self, SourceError> {
        source.begin_critical_section()?;
        let mut guard = Self {
            source,
            original: true,
            forced: false,
            released: false,
        };
        guard.original = guard.source.schedule_public()?;
        if !guard.original {
            guard.forced = true;
            guard.source.set_schedule_public(true)?;
        }
        Ok(guard)
    }

    /// Visibility before the run started.
    pub fn original(&self) -> bool {
        self.original
    }

    /// Whether the flag had to be forced public.
    pub fn forced(&self) -> bool {
        self.forced
    }

    pub fn release(mut self) -> Result<(), SourceError> {
        self.restore()
    }

    fn restore(&mut self) -> Result<(), SourceError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let restored = if self.forced {
            self.source.set_schedule_public(self.original)
        } else {
            Ok(())
        };
        let ended = self.source.end_critical_section();
        restored.and(ended)
    }
}

impl Drop for VisibilityGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        export_warn!("Visibility guard dropped without release, restoring");
        if let Err(err) = self.restore() {
            export_error!("Failed to restore schedule visibility: {}", err);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgramDocument {
    #[serde(flatten)]
    conference: ConferenceSnapshot,
    #[serde(default)]
    schedule_public: bool,
    #[serde(default)]
    revision: u64,
}

/// Program source backed by a JSON document on disk.
///
/// Visibility writes are persisted immediately so a renderer reading the same
/// document sees them. Writes outside a critical section bump `revision`.
#[derive(Debug)]
pub struct JsonProgramSource {
    path: PathBuf,
    in_critical_section: AtomicBool,
}

impl JsonProgramSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            in_critical_section: AtomicBool::new(false),
        }
    }

    /// Number of recorded edits to the document.
    pub fn revision(&self) -> Result<u64, SourceError> {
        Ok(self.load()?.revision)
    }

    fn load(&self) -> Result<ProgramDocument, SourceError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn store(&self, document: &ProgramDocument) -> Result<(), SourceError> {
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SourceError::Unavailable(format!("{:?} is not a file", self.path)))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let content = serde_json::to_vec_pretty(document)?;
        AtomicFileWriter::new(dir).write(file_name, &content)?;
        Ok(())
    }
}

impl ProgramSource for JsonProgramSource {
    fn snapshot(&self) -> Result<ConferenceSnapshot, SourceError> {
        Ok(self.load()?.conference)
    }

    fn schedule_public(&self) -> Result<bool, SourceError> {
        Ok(self.load()?.schedule_public)
    }

    fn begin_critical_section(&self) -> Result<(), SourceError> {
        self.in_critical_section
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| SourceError::AlreadyInCriticalSection)
    }

    fn set_schedule_public(&self, public: bool) -> Result<(), SourceError> {
        let mut document = self.load()?;
        document.schedule_public = public;
        if !self.in_critical_section.load(Ordering::Acquire) {
            document.revision += 1;
        }
        self.store(&document)
    }

    fn end_critical_section(&self) -> Result<(), SourceError> {
        self.in_critical_section
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| SourceError::NotInCriticalSection)
    }
}
