//! The crawl and search engine.
//!
//! Each root gets its own crawler thread that walks the tree sequentially.
//! Regular files are searched by short-lived grep worker threads, at most
//! `max_grep_workers` at a time; a crawler that finds the pool full waits for
//! a slot. The reporter watches the shared statistics from the calling thread.
pub mod crawler;
pub mod engine;
pub mod grep;
pub mod matcher;

pub use engine::run;
pub use grep::{FileScan, MAX_LINE_LENGTH};
pub use matcher::LiteralMatcher;
