use std::io::Write;
use std::sync::Arc;
use tracing::info;

use crate::context::SearchContext;
use crate::errors::{CrawlError, CrawlResult};
use crate::stats::StatsRecord;

/// Renders live progress until every crawler and grep worker has finished.
///
/// The reporter never touches the filesystem and never polls. Each round it
/// sleeps on the context's notifier, consumes exactly one event, then takes a
/// single snapshot of the statistics:
///
/// ```text
/// WAITING --event--> SNAPSHOT --work left--> PRINT --> WAITING
///                             --all idle---> DONE
/// ```
///
/// Waiting before every completion check is what makes the final decrement
/// visible: reading the counters first could see the all-zero state from
/// before the first crawler started.
pub struct Reporter<W: Write> {
    ctx: Arc<SearchContext>,
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(ctx: Arc<SearchContext>, out: W) -> Self {
        Self { ctx, out }
    }

    /// Runs to completion and returns the final snapshot.
    ///
    /// A failure recorded by any task ends the loop at once with that error
    /// and nothing more is written. Each rendering happens under the
    /// context's failure lock, so a failure lands either before a rendering,
    /// suppressing it, or after it has been written.
    pub fn run(mut self) -> CrawlResult<StatsRecord> {
        let last = loop {
            self.ctx.events().wait();
            let snapshot = self.ctx.stats().snapshot();
            let out = &mut self.out;

            if !snapshot.is_active() {
                self.ctx.unless_failed(|| finish(out, &snapshot))??;
                break snapshot;
            }
            self.ctx.unless_failed(|| render(out, &snapshot))??;
        };

        info!(
            "Crawl complete: {} of {} lines matched in {} of {} files across {} directories (peak {} of {} grep workers)",
            last.line_hits,
            last.lines,
            last.file_hits,
            last.files,
            last.dirs,
            last.peak_grep_workers,
            last.max_grep_workers
        );
        Ok(last)
    }
}

/// Overwrites the status line in place
fn render<W: Write>(out: &mut W, snapshot: &StatsRecord) -> CrawlResult<()> {
    write!(out, "{}\r", snapshot).map_err(CrawlError::Output)?;
    out.flush().map_err(CrawlError::Output)
}

/// Final rendering, terminated by a newline
fn finish<W: Write>(out: &mut W, snapshot: &StatsRecord) -> CrawlResult<()> {
    render(out, snapshot)?;
    writeln!(out).map_err(CrawlError::Output)?;
    out.flush().map_err(CrawlError::Output)
}
