use parking_lot::Mutex;
use std::fmt;

/// Aggregate counters for one crawl.
///
/// A value of this type lives behind the [`Statistics`] lock and every copy
/// taken out of it is a consistent snapshot: all fields were read at the same
/// instant. Independent counters carry no ordering between each other, so a
/// snapshot may show a file as started before any of its lines are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsRecord {
    /// Line units read across all files
    pub lines: u64,
    /// Line units containing the search term
    pub line_hits: u64,
    /// Files whose read has started
    pub files: u64,
    /// Files with at least one matching line
    pub file_hits: u64,
    /// Directories visited, roots included
    pub dirs: u64,
    pub active_crawlers: usize,
    pub active_grep_workers: usize,
    /// Pool capacity, fixed for the run
    pub max_grep_workers: usize,
    /// Highest `active_grep_workers` seen so far
    pub peak_grep_workers: usize,
}

impl StatsRecord {
    pub fn new(max_grep_workers: usize) -> Self {
        Self {
            max_grep_workers,
            ..Self::default()
        }
    }

    /// True while any crawler or grep worker is still running
    pub fn is_active(&self) -> bool {
        self.active_crawlers > 0 || self.active_grep_workers > 0
    }

    pub(crate) fn crawler_started(&mut self) {
        self.active_crawlers += 1;
    }

    pub(crate) fn crawler_finished(&mut self) {
        debug_assert!(self.active_crawlers > 0, "crawler count underflow");
        self.active_crawlers = self.active_crawlers.saturating_sub(1);
    }

    pub(crate) fn grep_started(&mut self) {
        self.active_grep_workers += 1;
        debug_assert!(
            self.active_grep_workers <= self.max_grep_workers,
            "{} grep workers active with a cap of {}",
            self.active_grep_workers,
            self.max_grep_workers
        );
        self.peak_grep_workers = self.peak_grep_workers.max(self.active_grep_workers);
    }

    pub(crate) fn grep_finished(&mut self) {
        debug_assert!(self.active_grep_workers > 0, "grep worker count underflow");
        self.active_grep_workers = self.active_grep_workers.saturating_sub(1);
    }

    /// Checks the invariants that must hold after every lock release
    pub fn is_consistent(&self) -> bool {
        self.line_hits <= self.lines
            && self.file_hits <= self.files
            && self.active_grep_workers <= self.max_grep_workers
            && self.peak_grep_workers <= self.max_grep_workers
    }
}

/// Renders the status line without any cursor control
impl fmt::Display for StatsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} lines, {}/{} files, {} directories, {} active threads",
            self.line_hits,
            self.lines,
            self.file_hits,
            self.files,
            self.dirs,
            self.active_grep_workers
        )
    }
}

/// The shared statistics record, mutated by every crawler and grep worker.
///
/// Critical sections are a single read-modify-write; callers never hold the
/// lock across I/O or thread creation.
#[derive(Debug)]
pub struct Statistics {
    record: Mutex<StatsRecord>,
}

impl Statistics {
    pub fn new(max_grep_workers: usize) -> Self {
        Self {
            record: Mutex::new(StatsRecord::new(max_grep_workers)),
        }
    }

    /// Applies one serialized mutation
    pub fn update(&self, mutate: impl FnOnce(&mut StatsRecord)) {
        let mut record = self.record.lock();
        mutate(&mut record);
        debug_assert!(record.is_consistent(), "inconsistent stats: {:?}", *record);
    }

    /// Takes a consistent copy of all counters
    pub fn snapshot(&self) -> StatsRecord {
        *self.record.lock()
    }
}
