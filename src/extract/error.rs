//! Error types for answer extraction.

use thiserror::Error;

/// Marker line a binary forecast must contain.
pub const PROBABILITY_MARKER: &str = "Probability: ";
/// Marker for a multiple-choice probability list.
pub const PROBABILITIES_MARKER: &str = "Probabilities: [...]";
/// Anchor line that opens a percentile block.
pub const DISTRIBUTION_MARKER: &str = "Distribution:";
/// Anchor line that opens a list of research queries.
pub const SEARCH_QUERIES_MARKER: &str = "Search queries:";

/// Errors that can occur when extracting a structured answer from model text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// The structured block the extractor looks for is absent.
    #[error("no '{marker}' found in response")]
    MissingMarker { marker: &'static str },

    /// A value was located but is not a usable number.
    #[error("invalid number {value:?}: {reason}")]
    InvalidNumber { value: String, reason: String },

    /// A probability list was located but holds no values.
    #[error("probability list is empty")]
    EmptyProbabilityList,

    /// Option count differs from the question's option list.
    #[error("expected {expected} probabilities, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A distribution anchor was found but no whitelisted percentile followed it.
    #[error("no valid percentiles extracted after '{}'", DISTRIBUTION_MARKER)]
    NoPercentiles,

    /// A query list anchor was found but no list item followed it.
    #[error("no search queries listed after '{}'", SEARCH_QUERIES_MARKER)]
    NoSearchQueries,
}

impl ExtractError {
    pub fn missing(marker: &'static str) -> Self {
        Self::MissingMarker { marker }
    }

    pub fn invalid_number(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNumber {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True when nothing resembling an answer was found, as opposed to an
    /// answer that was found but could not be used.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingMarker { .. })
    }

    /// Get a short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingMarker { .. } => "missing_marker",
            Self::InvalidNumber { .. } => "invalid_number",
            Self::EmptyProbabilityList => "empty_probability_list",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::NoPercentiles => "no_percentiles",
            Self::NoSearchQueries => "no_search_queries",
        }
    }
}
