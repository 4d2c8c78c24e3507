//! Error types for treescout.
//!
//! There are two kinds of failure. A configuration error means the run never
//! started: bad arguments or an unreadable settings file. Everything else is a
//! system failure, an OS operation that went wrong mid-run. System failures are
//! never retried or recovered locally; they travel up to the single top-level
//! handler which ends the process.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for crawl operations
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Errors that can occur while configuring or running a crawl
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Settings error: {0}")]
    SettingsError(#[from] config::ConfigError),
    #[error("Invalid search term: {0}")]
    InvalidTerm(String),
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[error("opendir failed for {0}: not a directory")]
    NotADirectory(PathBuf),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] ignore::Error),
    #[error("Failed to spawn {task} thread: {source}")]
    Spawn { task: &'static str, source: io::Error },
    #[error("Failed to write status line: {0}")]
    Output(#[source] io::Error),
}

impl CrawlError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_term(msg: impl Into<String>) -> Self {
        Self::InvalidTerm(msg.into())
    }

    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn spawn(task: &'static str, source: io::Error) -> Self {
        Self::Spawn { task, source }
    }

    /// True for errors raised before any work started.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_) | Self::SettingsError(_) | Self::InvalidTerm(_)
        )
    }
}
