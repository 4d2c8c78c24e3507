use regex::bytes::Regex;

use crate::errors::{CrawlError, CrawlResult};

/// Literal, case-sensitive substring test over raw line bytes.
///
/// The term is escaped before compiling, so regex metacharacters only ever
/// match themselves. Working on bytes means files that are not valid UTF-8
/// are still searched. An empty term matches every line.
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    regex: Regex,
}

impl LiteralMatcher {
    pub fn new(term: &str) -> CrawlResult<Self> {
        let regex = Regex::new(&regex::escape(term))
            .map_err(|e| CrawlError::invalid_term(e.to_string()))?;
        Ok(Self { regex })
    }

    /// True if the term occurs anywhere in `line`
    pub fn is_match(&self, line: &[u8]) -> bool {
        self.regex.is_match(line)
    }
}
