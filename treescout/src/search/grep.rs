use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::debug;

use crate::context::SearchContext;
use crate::errors::{CrawlError, CrawlResult};
use crate::sync::PoolSlot;

/// Longest line, in bytes and without its terminator, searched as one unit.
/// Longer physical lines are searched as several consecutive units.
pub const MAX_LINE_LENGTH: usize = 4096;

const UNIT_CAPACITY: usize = MAX_LINE_LENGTH + 1;
const BUFFER_CAPACITY: usize = 65536;

/// Line counts for one searched file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileScan {
    pub lines: u64,
    pub line_hits: u64,
}

impl FileScan {
    pub fn is_hit(&self) -> bool {
        self.line_hits > 0
    }
}

/// Starts a detached grep worker for `path`.
///
/// The caller must already hold `slot` and have counted the worker as active.
/// The worker gives the slot back when it is done.
pub(crate) fn spawn(ctx: Arc<SearchContext>, path: PathBuf, slot: PoolSlot) -> CrawlResult<()> {
    thread::Builder::new()
        .name("grep".to_string())
        .spawn(move || run(&ctx, &path, slot))
        .map(|_| ())
        .map_err(|e| CrawlError::spawn("grep", e))
}

fn run(ctx: &SearchContext, path: &Path, slot: PoolSlot) {
    match grep_file(ctx, path) {
        Ok(scan) => debug!(
            "Finished {}: {}/{} lines matched",
            path.display(),
            scan.line_hits,
            scan.lines
        ),
        Err(err) => {
            ctx.fail(err);
            return;
        }
    }

    ctx.stats().update(|s| s.grep_finished());
    slot.release();
    ctx.events().post();
}

/// Searches one file, counting it, its lines and its hits in the shared
/// statistics as it goes.
pub fn grep_file(ctx: &SearchContext, path: &Path) -> CrawlResult<FileScan> {
    let file = File::open(path).map_err(|e| CrawlError::io("open file", path, e))?;
    ctx.update(|s| s.files += 1);

    let reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
    let scan = scan_lines(ctx, reader, path)?;

    if scan.is_hit() {
        ctx.update(|s| s.file_hits += 1);
    }
    Ok(scan)
}

/// Reads `reader` one line unit at a time and searches each unit.
///
/// A unit ends after a newline or after [`MAX_LINE_LENGTH`] + 1 bytes,
/// whichever comes first. Any read error other than a clean end of stream is
/// returned as is.
pub fn scan_lines<R: BufRead>(
    ctx: &SearchContext,
    mut reader: R,
    path: &Path,
) -> CrawlResult<FileScan> {
    let mut scan = FileScan::default();
    let mut unit = Vec::with_capacity(UNIT_CAPACITY);

    loop {
        unit.clear();
        let read = (&mut reader)
            .take(UNIT_CAPACITY as u64)
            .read_until(b'\n', &mut unit)
            .map_err(|e| CrawlError::io("read line", path, e))?;
        if read == 0 {
            break;
        }

        scan.lines += 1;
        ctx.update(|s| s.lines += 1);

        if ctx.matcher().is_match(&unit) {
            scan.line_hits += 1;
            ctx.update(|s| s.line_hits += 1);
        }
    }

    Ok(scan)
}
