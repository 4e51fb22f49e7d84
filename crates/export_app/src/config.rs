//! Command line and config file handling for export_app.
//!
//! Settings are layered: built-in defaults, then the optional RON config
//! file, then command line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use export_logging::{LevelFilter, LogDestination};
use program_export::{ExportSettings, FetchSettings, Protocol, RendererSettings};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolChoice {
    Http,
    Https,
}

impl From<ProtocolChoice> for Protocol {
    fn from(choice: ProtocolChoice) -> Self {
        match choice {
            ProtocolChoice::Http => Protocol::Http,
            ProtocolChoice::Https => Protocol::Https,
        }
    }
}

/// Export a conference program as a static site archive.
#[derive(Debug, Parser, Clone)]
#[command(author, version, about = "Export a conference program as a static site")]
pub struct CliArgs {
    /// Conference document (JSON) holding the program and its visibility flag.
    #[arg(long, value_name = "FILE")]
    pub conference: PathBuf,

    /// RON config file; every field is optional.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Two-letter locale prefix for rendered pages.
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Renderer host, with optional port.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    #[arg(long, value_enum)]
    pub protocol: Option<ProtocolChoice>,

    #[arg(long, value_name = "DIR")]
    pub export_root: Option<PathBuf>,

    /// Live public asset tree to copy referenced files from.
    #[arg(long, value_name = "DIR")]
    pub asset_root: Option<PathBuf>,

    /// Leave the export directory unpacked.
    #[arg(long)]
    pub no_archive: bool,

    /// off, error, warn, info, debug or trace.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also write the log to ./export.log.
    #[arg(long)]
    pub log_file: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    pub protocol: Option<ProtocolChoice>,
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub redirect_limit: Option<usize>,
    pub max_bytes: Option<u64>,
    pub page_concurrency: Option<usize>,
    pub job_timeout_secs: Option<u64>,
}

/// Contents of the RON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub locale: Option<String>,
    pub export_root: Option<PathBuf>,
    pub asset_root: Option<PathBuf>,
    pub create_archive: Option<bool>,
    pub log_level: Option<String>,
    pub renderer: RendererConfig,
    pub fetch: FetchConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply(&self, settings: &mut ExportSettings) {
        if let Some(root) = &self.export_root {
            settings.export_root = root.clone();
        }
        if let Some(root) = &self.asset_root {
            settings.asset_root = root.clone();
        }
        if let Some(create_archive) = self.create_archive {
            settings.create_archive = create_archive;
        }
        self.renderer.apply(&mut settings.renderer);
        self.fetch.apply(&mut settings.fetch);
    }
}

impl RendererConfig {
    fn apply(&self, renderer: &mut RendererSettings) {
        if let Some(protocol) = self.protocol {
            renderer.protocol = protocol.into();
        }
        if let Some(host) = &self.host {
            renderer.host = host.clone();
        }
    }
}

impl FetchConfig {
    fn apply(&self, fetch: &mut FetchSettings) {
        if let Some(secs) = self.connect_timeout_secs {
            fetch.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            fetch.request_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = self.redirect_limit {
            fetch.redirect_limit = limit;
        }
        if let Some(max_bytes) = self.max_bytes {
            fetch.max_bytes = max_bytes;
        }
        if let Some(concurrency) = self.page_concurrency {
            fetch.page_concurrency = concurrency;
        }
        if let Some(secs) = self.job_timeout_secs {
            fetch.job_timeout = Some(Duration::from_secs(secs));
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub conference: PathBuf,
    pub locale: Option<String>,
    pub settings: ExportSettings,
    pub log_level: LevelFilter,
    pub log_destination: LogDestination,
}

impl CliArgs {
    pub fn resolve(self) -> Result<AppConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let mut settings = ExportSettings::default();
        file.apply(&mut settings);
        if let Some(root) = self.export_root {
            settings.export_root = root;
        }
        if let Some(root) = self.asset_root {
            settings.asset_root = root;
        }
        if let Some(protocol) = self.protocol {
            settings.renderer.protocol = protocol.into();
        }
        if let Some(host) = self.host {
            settings.renderer.host = host;
        }
        if self.no_archive {
            settings.create_archive = false;
        }

        let log_level = match self.log_level.or(file.log_level) {
            Some(level) => level
                .parse::<LevelFilter>()
                .map_err(|_| ConfigError::InvalidLogLevel(level))?,
            None => LevelFilter::Info,
        };
        let log_destination = if self.log_file {
            LogDestination::terminal_and_default_file()
        } else {
            LogDestination::Terminal
        };

        Ok(AppConfig {
            conference: self.conference,
            locale: self.locale.or(file.locale),
            settings,
            log_level,
            log_destination,
        })
    }
}
