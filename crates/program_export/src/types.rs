use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use export_logging::{export_debug, export_info, export_warn};
use program_core::ExportStage;

/// A page as returned by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

/// Why a page was left out of the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Cancelled,
    Network,
    Rewrite,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Rewrite => write!(f, "html rewrite failed"),
        }
    }
}

/// Progress and diagnostics of a running export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    StageEntered(ExportStage),
    PageWritten {
        source: String,
        target: String,
        bytes: u64,
    },
    PageSkipped {
        source: String,
        target: String,
        failure: FailureKind,
        message: String,
    },
    AssetCopied {
        path: String,
    },
    AssetMissing {
        path: PathBuf,
    },
}

/// Operator-visible channel for export progress. Never used for control flow.
pub trait ExportEventSink: Send + Sync {
    fn emit(&self, event: ExportEvent);
}

/// Renders export events as log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl ExportEventSink for LogEventSink {
    fn emit(&self, event: ExportEvent) {
        match event {
            ExportEvent::StageEntered(stage) => export_info!("Export stage {}", stage),
            ExportEvent::PageWritten {
                source,
                target,
                bytes,
            } => export_debug!("Wrote \"{}\" as \"{}\" ({} bytes)", source, target, bytes),
            ExportEvent::PageSkipped {
                source,
                target,
                failure,
                message,
            } => export_warn!(
                "Failed to fetch \"{}\" as \"{}\": {} ({})",
                source,
                target,
                failure,
                message
            ),
            ExportEvent::AssetCopied { path } => export_debug!("Copied asset \"{}\"", path),
            ExportEvent::AssetMissing { path } => {
                export_warn!("Missing asset {:?}, skipped", path)
            }
        }
    }
}
