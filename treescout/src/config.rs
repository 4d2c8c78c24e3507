use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{CrawlError, CrawlResult};

/// Parameters of a single crawl.
///
/// Built once at startup from the command line and never changed afterwards.
/// The search term is shared read-only by every grep worker, and
/// `max_grep_workers` fixes the capacity of the worker pool for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Literal, case-sensitive term searched for in every line
    pub search_term: String,

    /// Maximum number of files searched at the same time
    pub max_grep_workers: NonZeroUsize,

    /// Directory trees to crawl, one crawler each
    pub roots: Vec<PathBuf>,
}

impl CrawlConfig {
    /// Validates raw command-line values into a config.
    ///
    /// `max_grep_workers` must be a whole positive decimal number and at least
    /// one root is required; anything else is a configuration error.
    pub fn new(
        search_term: impl Into<String>,
        max_grep_workers: &str,
        roots: Vec<PathBuf>,
    ) -> CrawlResult<Self> {
        let workers: i64 = max_grep_workers.parse().map_err(|_| {
            CrawlError::config_error(format!(
                "max-grep-workers is not an integer: '{}'",
                max_grep_workers
            ))
        })?;
        let max_grep_workers = usize::try_from(workers)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                CrawlError::config_error("max-grep-workers must not be negative or zero")
            })?;

        if roots.is_empty() {
            return Err(CrawlError::config_error("at least one root is required"));
        }

        Ok(Self {
            search_term: search_term.into(),
            max_grep_workers,
            roots,
        })
    }
}

/// Ambient settings that do not affect what is searched.
///
/// Only read from a file the user names explicitly; there is no implicit
/// lookup in the home or working directory. Example:
/// ```yaml
/// # Log level (trace, debug, info, warn, error)
/// log_level: "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or returns the defaults when no path is given
    pub fn load_from(path: Option<&Path>) -> CrawlResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let settings = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Command-line values take precedence over file values
    pub fn merge_with_cli(mut self, log_level: Option<String>) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }
}
