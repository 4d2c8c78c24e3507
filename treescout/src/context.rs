use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

use crate::errors::{CrawlError, CrawlResult};
use crate::search::LiteralMatcher;
use crate::stats::{Statistics, StatsRecord};
use crate::sync::{Notifier, WorkerPool};

/// State shared by every task of one crawl.
///
/// Constructed once per run and handed to crawlers and grep workers behind an
/// `Arc`. The statistics lock and the pool are never held at the same time.
#[derive(Debug)]
pub struct SearchContext {
    stats: Statistics,
    pool: WorkerPool,
    events: Notifier,
    matcher: LiteralMatcher,
    failure: Mutex<Option<CrawlError>>,
}

impl SearchContext {
    pub fn new(matcher: LiteralMatcher, max_grep_workers: NonZeroUsize) -> Self {
        Self {
            stats: Statistics::new(max_grep_workers.get()),
            pool: WorkerPool::new(max_grep_workers),
            events: Notifier::new(),
            matcher,
            failure: Mutex::new(None),
        }
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn events(&self) -> &Notifier {
        &self.events
    }

    pub fn matcher(&self) -> &LiteralMatcher {
        &self.matcher
    }

    /// Mutates the statistics, then posts one notification.
    ///
    /// The lock is released before the post, so the reporter always sees the
    /// mutation once it has consumed the matching event.
    pub fn update(&self, mutate: impl FnOnce(&mut StatsRecord)) {
        self.stats.update(mutate);
        self.events.post();
    }

    /// Records a fatal failure and wakes the reporter.
    ///
    /// Only the first failure is kept; later ones are dropped. The kept one is
    /// reported once, by whoever handles the error returned from the run.
    pub fn fail(&self, err: CrawlError) {
        debug!("Task failed: {}", err);
        {
            let mut failure = self.failure.lock();
            if failure.is_none() {
                *failure = Some(err);
            }
        }
        self.events.post();
    }

    /// Runs `f` only if no failure has been recorded.
    ///
    /// The failure lock is held while `f` runs, so a concurrent `fail`
    /// completes either before the check (and `f` is skipped) or after `f`
    /// has returned.
    pub fn unless_failed<T>(&self, f: impl FnOnce() -> T) -> CrawlResult<T> {
        let mut failure = self.failure.lock();
        match failure.take() {
            Some(err) => Err(err),
            None => Ok(f()),
        }
    }
}
