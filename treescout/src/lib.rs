pub mod config;
pub mod context;
pub mod errors;
pub mod reporter;
pub mod search;
pub mod stats;
pub mod sync;

pub use crate::config::{CrawlConfig, Settings};
pub use errors::{CrawlError, CrawlResult};
pub use search::run;
pub use stats::StatsRecord;
