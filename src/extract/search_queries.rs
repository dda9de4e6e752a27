//! Research queries listed after "Search queries:".

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::error::{ExtractError, SEARCH_QUERIES_MARKER};
use crate::normalize::clean_line;

/// At most this many queries are returned, in the order written.
pub const MAX_SEARCH_QUERIES: usize = 5;

/// Items this short or shorter (in chars) are list debris, not queries.
pub const MIN_QUERY_CHARS: usize = 5;

const ANCHOR: &str = "search queries:";

// "1. query", "2) query", "- query", "• query"
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\d{1,2}[.)]|[-*•])\s+(.+?)\s*$").expect("Invalid list item regex")
});

/// Parse the numbered query list of a search-query generation response.
///
/// Query text is kept verbatim apart from list markers and wrapping quotes;
/// only the anchor is matched on the normalized line. Items of at most
/// [`MIN_QUERY_CHARS`] characters are dropped, and the list is capped at
/// [`MAX_SEARCH_QUERIES`] since the prompt asks for no more than that.
pub fn parse_search_queries(content: &str) -> Result<Vec<String>, ExtractError> {
    let mut lines = content.lines();
    if !lines.by_ref().any(|l| clean_line(l).contains(ANCHOR)) {
        return Err(ExtractError::missing(SEARCH_QUERIES_MARKER));
    }

    let queries: Vec<String> = lines
        .filter_map(|line| LIST_ITEM.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| unquote(m.as_str()).to_string()))
        .filter(|q| q.chars().count() > MIN_QUERY_CHARS)
        .take(MAX_SEARCH_QUERIES)
        .collect();

    if queries.is_empty() {
        return Err(ExtractError::NoSearchQueries);
    }
    debug!(count = queries.len(), "parsed search queries");
    Ok(queries)
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for (open, close) in [('"', '"'), ('\u{201C}', '\u{201D}'), ('\'', '\'')] {
        if let Some(inner) = s.strip_prefix(open).and_then(|r| r.strip_suffix(close)) {
            return inner.trim();
        }
    }
    s
}
