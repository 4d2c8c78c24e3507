use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace};

use super::grep;
use crate::context::SearchContext;
use crate::errors::{CrawlError, CrawlResult};

/// Starts a detached crawler thread for `root`.
///
/// The caller counts the crawler as active before calling this; the crawler
/// itself uncounts it when its walk is complete.
pub(crate) fn spawn(ctx: Arc<SearchContext>, root: PathBuf) -> CrawlResult<()> {
    thread::Builder::new()
        .name(format!("crawl {}", root.display()))
        .spawn(move || {
            if let Err(err) = crawl_tree(&ctx, &root) {
                ctx.fail(err);
                return;
            }
            ctx.update(|s| s.crawler_finished());
        })
        .map(|_| ())
        .map_err(|e| CrawlError::spawn("crawler", e))
}

/// Walks `root` depth-first on the calling thread.
///
/// Directories are counted and descended into in listing order. Regular files
/// are handed to grep workers, waiting for a pool slot when all are taken.
/// Symbolic links below the root are neither followed nor searched; a root
/// that is itself a link to a directory is walked like the directory.
pub fn crawl_tree(ctx: &Arc<SearchContext>, root: &Path) -> CrawlResult<()> {
    debug!("Crawling {}", root.display());

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = entry?;
        let Some(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            debug!("Entering directory {}", entry.path().display());
            ctx.update(|s| s.dirs += 1);
        } else if entry.depth() == 0 {
            return Err(CrawlError::NotADirectory(entry.into_path()));
        } else if file_type.is_file() {
            dispatch(ctx, entry.into_path())?;
        }
    }

    Ok(())
}

/// Takes a pool slot and starts a grep worker on `path`
fn dispatch(ctx: &Arc<SearchContext>, path: PathBuf) -> CrawlResult<()> {
    let slot = ctx.pool().acquire();
    ctx.update(|s| s.grep_started());
    trace!("Dispatching {}", path.display());
    grep::spawn(Arc::clone(ctx), path, slot)
}
