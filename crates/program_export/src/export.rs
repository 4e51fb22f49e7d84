use std::path::{Path, PathBuf};
use std::sync::Arc;

use export_logging::{export_debug, export_error, export_info};
use futures_util::{stream, StreamExt};
use program_core::{
    export_base_path, plan_paths, renderer_path, AssetPathSet, ConferenceSnapshot, ExportStage,
    PathSpec, ReferenceRewriter,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::assets::{AssetCopier, AssetCopyReport};
use crate::decode::decode_text;
use crate::fetch::{FetchSettings, HttpPageFetcher, PageFetcher, RendererSettings};
use crate::html::HtmlRewriter;
use crate::package::{create_archive, create_index_page, ArchiveError};
use crate::persist::{reset_directory, safe_join, AtomicFileWriter, PersistError};
use crate::source::{ProgramSource, SourceError, VisibilityGuard};
use crate::{ExportEvent, ExportEventSink, FailureKind, FetchError, FetchedPage, LogEventSink};

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Directory receiving `{acronym}/` and `{acronym}.tar.gz`.
    pub export_root: PathBuf,
    /// Live public asset tree, addressed by the paths found in rendered pages.
    pub asset_root: PathBuf,
    pub renderer: RendererSettings,
    pub fetch: FetchSettings,
    pub create_archive: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            export_root: PathBuf::from("tmp").join("static_export"),
            asset_root: PathBuf::from("public"),
            renderer: RendererSettings::default(),
            fetch: FetchSettings::default(),
            create_archive: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("program source error: {0}")]
    Source(#[from] SourceError),
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("renderer setup failed: {0}")]
    Renderer(#[from] FetchError),
    #[error("invalid program export base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub acronym: String,
    pub export_dir: PathBuf,
    pub archive_path: Option<PathBuf>,
    pub pages_planned: usize,
    pub pages_written: usize,
    pub pages_skipped: usize,
    pub assets_copied: usize,
    pub assets_missing: usize,
    pub index_created: bool,
}

/// State of one export run.
#[derive(Debug, Clone)]
struct ExportJob {
    acronym: String,
    locale: Option<String>,
    base_directory: PathBuf,
    base_url: String,
    original_schedule_public: bool,
    asset_paths: AssetPathSet,
}

impl ExportJob {
    fn new(
        conference: &ConferenceSnapshot,
        locale: Option<&str>,
        export_root: &Path,
        original_schedule_public: bool,
    ) -> Result<Self, ExportError> {
        let acronym = conference.acronym.as_str();
        let base_directory = safe_join(export_root, acronym)
            .filter(|_| !acronym.contains(['/', '\\']))
            .ok_or_else(|| PersistError::UnsafePath(acronym.to_string()))?;
        Ok(Self {
            acronym: acronym.to_string(),
            locale: locale.map(str::to_string),
            base_directory,
            base_url: export_base_path(conference.program_export_base_url.as_deref())?,
            original_schedule_public,
            asset_paths: AssetPathSet::new(),
        })
    }
}

#[derive(Debug, Default)]
struct PageReport {
    planned: usize,
    written: usize,
    skipped: usize,
}

/// Drives one complete export of a conference program.
pub struct ProgramExporter {
    source: Arc<dyn ProgramSource>,
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn ExportEventSink>,
    settings: ExportSettings,
    cancel: CancellationToken,
}

impl ProgramExporter {
    pub fn new(
        source: Arc<dyn ProgramSource>,
        fetcher: Arc<dyn PageFetcher>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            source,
            fetcher,
            sink: Arc::new(LogEventSink),
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Exporter fetching pages over HTTP from `settings.renderer`.
    pub fn over_http(
        source: Arc<dyn ProgramSource>,
        settings: ExportSettings,
    ) -> Result<Self, ExportError> {
        let fetcher = HttpPageFetcher::new(&settings.renderer, settings.fetch.clone())?;
        Ok(Self::new(source, Arc::new(fetcher), settings))
    }

    pub fn with_sink(mut self, sink: Arc<dyn ExportEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Pages not yet fetched when `cancel` fires are skipped.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run a full export.
    ///
    /// The visibility flag is restored before any error is returned. Skipped
    /// pages and missing assets do not fail the run.
    pub async fn run(&self, locale: Option<&str>) -> Result<ExportSummary, ExportError> {
        self.sink.emit(ExportEvent::StageEntered(ExportStage::Start));

        let guard = VisibilityGuard::acquire(self.source.as_ref())?;
        let forced = guard.forced();
        if forced {
            self.sink
                .emit(ExportEvent::StageEntered(ExportStage::VisibilityForced));
        }

        let outcome = self.export_with_visibility(locale, guard.original()).await;
        let released = guard.release();
        let mut summary = match (outcome, released) {
            (Ok(summary), Ok(())) => summary,
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(restore_err)) => {
                export_error!(
                    "Failed to restore schedule visibility after failed export: {}",
                    restore_err
                );
                return Err(err);
            }
            (Ok(_), Err(restore_err)) => return Err(restore_err.into()),
        };
        if forced {
            self.sink
                .emit(ExportEvent::StageEntered(ExportStage::VisibilityRestored));
        }

        if self.settings.create_archive {
            let archive = create_archive(&self.settings.export_root, &summary.acronym)?;
            summary.archive_path = Some(archive);
        }

        self.sink.emit(ExportEvent::StageEntered(ExportStage::Done));
        Ok(summary)
    }

    async fn export_with_visibility(
        &self,
        locale: Option<&str>,
        original_schedule_public: bool,
    ) -> Result<ExportSummary, ExportError> {
        let conference = self.source.snapshot()?;
        let mut job = ExportJob::new(
            &conference,
            locale,
            &self.settings.export_root,
            original_schedule_public,
        )?;

        export_info!(
            "Exporting {} (locale {:?}, schedule originally {}) to {:?} under {}",
            job.acronym,
            job.locale,
            if job.original_schedule_public { "public" } else { "private" },
            job.base_directory,
            job.base_url
        );
        reset_directory(&job.base_directory)?;
        self.sink
            .emit(ExportEvent::StageEntered(ExportStage::DirectoryReset));

        let pages = self.download_pages(&mut job, &conference).await?;
        self.sink
            .emit(ExportEvent::StageEntered(ExportStage::PagesDownloaded));

        let copier = AssetCopier::new(
            self.settings.asset_root.clone(),
            job.base_directory.clone(),
        );
        let AssetCopyReport { copied, missing } =
            copier.copy_all(&job.asset_paths, self.sink.as_ref())?;
        self.sink
            .emit(ExportEvent::StageEntered(ExportStage::AssetsCopied));

        let index_created = create_index_page(&job.base_directory)?;
        self.sink
            .emit(ExportEvent::StageEntered(ExportStage::IndexCreated));

        Ok(ExportSummary {
            acronym: job.acronym,
            export_dir: job.base_directory,
            archive_path: None,
            pages_planned: pages.planned,
            pages_written: pages.written,
            pages_skipped: pages.skipped,
            assets_copied: copied,
            assets_missing: missing,
            index_created,
        })
    }

    async fn download_pages(
        &self,
        job: &mut ExportJob,
        conference: &ConferenceSnapshot,
    ) -> Result<PageReport, ExportError> {
        let requests: Vec<(PathSpec, String)> = plan_paths(conference)
            .into_iter()
            .map(|spec| {
                let path = renderer_path(&job.acronym, job.locale.as_deref(), spec.source());
                (spec, path)
            })
            .collect();
        let mut report = PageReport {
            planned: requests.len(),
            ..PageReport::default()
        };

        let rewriter = HtmlRewriter::new(ReferenceRewriter::new(
            job.acronym.clone(),
            job.base_url.clone(),
        ));
        let writer = AtomicFileWriter::new(job.base_directory.clone());
        let deadline = self.settings.fetch.job_timeout.map(|t| Instant::now() + t);
        let concurrency = self.settings.fetch.page_concurrency.max(1);

        let mut fetched = stream::iter(requests)
            .map(|(spec, path)| async move {
                let result = self.fetch_page(&path, deadline).await;
                (spec, path, result)
            })
            .buffer_unordered(concurrency);

        while let Some((spec, path, result)) = fetched.next().await {
            let contents = result.and_then(|page| {
                page_contents(&rewriter, spec.target(), page, &mut job.asset_paths)
            });
            let contents = match contents {
                Ok(contents) => contents,
                Err(err) => {
                    report.skipped += 1;
                    self.sink.emit(ExportEvent::PageSkipped {
                        source: path,
                        target: spec.target().to_string(),
                        failure: err.kind,
                        message: err.message,
                    });
                    continue;
                }
            };

            let target = urlencoding::decode(spec.target())
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| spec.target().to_string());
            writer.write(&target, &contents)?;
            report.written += 1;
            self.sink.emit(ExportEvent::PageWritten {
                source: path,
                target: spec.target().to_string(),
                bytes: contents.len() as u64,
            });
        }

        Ok(report)
    }

    async fn fetch_page(
        &self,
        path: &str,
        deadline: Option<Instant>,
    ) -> Result<FetchedPage, FetchError> {
        let fetch = async {
            match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, self.fetcher.fetch(path))
                    .await
                    .unwrap_or_else(|_| {
                        Err(FetchError::new(FailureKind::Timeout, "export deadline elapsed"))
                    }),
                None => self.fetcher.fetch(path).await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(FetchError::new(FailureKind::Cancelled, "export cancelled"))
            }
            result = fetch => result,
        }
    }
}

/// Bytes to store for a fetched page, by target type.
fn page_contents(
    rewriter: &HtmlRewriter,
    target: &str,
    page: FetchedPage,
    assets: &mut AssetPathSet,
) -> Result<Vec<u8>, FetchError> {
    if target.ends_with(".pdf") {
        return Ok(page.body.to_vec());
    }
    let decoded = decode_text(&page.body, page.content_type.as_deref());
    if decoded.had_errors {
        export_debug!(
            "Replaced malformed {} sequences in \"{}\"",
            decoded.encoding_label,
            target
        );
    }
    if target.ends_with(".html") {
        let html = rewriter
            .rewrite(&decoded.text, assets)
            .map_err(|err| FetchError::new(FailureKind::Rewrite, err.to_string()))?;
        return Ok(html.into_bytes());
    }
    Ok(decoded.text.into_bytes())
}
