mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use export_logging::{export_info, export_warn};
use program_export::{CancellationToken, ExportSummary, JsonProgramSource, ProgramExporter};

use crate::config::CliArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();
    match run(cli).await {
        Ok(summary) => {
            let output = summary.archive_path.as_ref().unwrap_or(&summary.export_dir);
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("program export failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: CliArgs) -> anyhow::Result<ExportSummary> {
    let config = cli.resolve().context("invalid configuration")?;
    export_logging::initialize(config.log_destination.clone(), config.log_level);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let source = Arc::new(JsonProgramSource::new(&config.conference));
    let exporter = ProgramExporter::over_http(source, config.settings)
        .context("failed to set up the renderer client")?
        .with_cancellation(cancel);

    let summary = exporter
        .run(config.locale.as_deref())
        .await
        .with_context(|| format!("export of {:?} failed", config.conference))?;

    export_info!(
        "Exported {}: {}/{} pages, {} assets ({} missing)",
        summary.acronym,
        summary.pages_written,
        summary.pages_planned,
        summary.assets_copied,
        summary.assets_missing
    );
    if summary.pages_skipped > 0 {
        export_warn!("{} pages were skipped", summary.pages_skipped);
    }
    Ok(summary)
}

/// Ctrl-C stops fetching; the run still restores visibility and finishes.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            export_warn!("Interrupted, skipping remaining pages");
            cancel.cancel();
        }
    });
}
