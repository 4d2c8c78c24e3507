use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

use super::crawler;
use super::matcher::LiteralMatcher;
use crate::config::CrawlConfig;
use crate::context::SearchContext;
use crate::errors::CrawlResult;
use crate::reporter::Reporter;
use crate::stats::StatsRecord;

/// Crawls every configured root in parallel, writing the live status line to
/// `out`, and returns the final statistics.
///
/// One detached crawler thread is started per root; the reporter runs on the
/// calling thread. The first fatal failure of any task is returned as soon as
/// the reporter sees it, possibly while other threads are still running.
pub fn run<W: Write>(config: &CrawlConfig, out: W) -> CrawlResult<StatsRecord> {
    info!(
        "Searching {} root(s) for '{}' with up to {} grep workers",
        config.roots.len(),
        config.search_term,
        config.max_grep_workers
    );

    let matcher = LiteralMatcher::new(&config.search_term)?;
    let ctx = Arc::new(SearchContext::new(matcher, config.max_grep_workers));

    for root in &config.roots {
        // Counted before the thread exists so the reporter can never see an
        // idle run while a crawler is still starting up.
        ctx.stats().update(|s| s.crawler_started());
        crawler::spawn(Arc::clone(&ctx), root.clone())?;
        debug!("Started crawler for {}", root.display());
    }

    Reporter::new(ctx, out).run()
}
