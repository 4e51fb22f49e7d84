//! Program export engine: fetches a rendered conference program, makes it
//! self-contained and packs it into an archive.
mod assets;
mod decode;
mod export;
mod fetch;
mod html;
mod package;
mod persist;
mod source;
mod types;

pub use assets::{AssetCopier, AssetCopyReport};
pub use decode::{decode_text, DecodedText};
pub use export::{ExportError, ExportSettings, ExportSummary, ProgramExporter};
pub use fetch::{FetchSettings, HttpPageFetcher, PageFetcher, Protocol, RendererSettings};
pub use html::{HtmlRewriter, RewriteError};
pub use package::{archive_path, create_archive, create_index_page, ArchiveError};
pub use persist::{ensure_output_dir, reset_directory, safe_join, AtomicFileWriter, PersistError};
pub use source::{JsonProgramSource, ProgramSource, SourceError, VisibilityGuard};
pub use types::{
    ExportEvent, ExportEventSink, FailureKind, FetchError, FetchedPage, LogEventSink,
};
pub use tokio_util::sync::CancellationToken;
