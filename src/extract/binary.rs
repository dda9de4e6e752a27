//! Binary forecasts: the last "Probability: NN%" line wins.

use tracing::debug;

use super::error::{ExtractError, PROBABILITY_MARKER};

/// Lowest probability ever returned for a binary question.
pub const BINARY_MIN: f64 = 0.01;
/// Highest probability ever returned for a binary question.
pub const BINARY_MAX: f64 = 0.99;

/// Returned by [`binary_probability_or_sentinel`] when extraction fails.
pub const BINARY_EXTRACTION_FAILED: f64 = -1.0;

/// Parse the final stated probability from a binary forecast.
///
/// Lines are scanned from the end, so a model that revises its number later in
/// the response is taken at its last word. Only the last marker line is
/// considered: if its value is unreadable the parse fails rather than falling
/// back to an earlier line.
pub fn parse_binary_probability(content: &str) -> Result<f64, ExtractError> {
    let lines: Vec<&str> = content.lines().collect();
    let (line_idx, line) = lines
        .iter()
        .enumerate()
        .rev()
        .find(|(_, line)| line.contains(PROBABILITY_MARKER))
        .ok_or_else(|| ExtractError::missing(PROBABILITY_MARKER))?;

    let raw = line
        .rsplit(PROBABILITY_MARKER)
        .next()
        .unwrap_or_default()
        .split('%')
        .next()
        .unwrap_or_default();
    let cleaned = raw.replace('*', "");
    let cleaned = cleaned.trim();

    let percent: f64 = cleaned
        .parse()
        .map_err(|e: std::num::ParseFloatError| ExtractError::invalid_number(cleaned, e.to_string()))?;
    if !percent.is_finite() {
        return Err(ExtractError::invalid_number(cleaned, "not a finite number"));
    }

    let probability = (percent * 0.01).clamp(BINARY_MIN, BINARY_MAX);
    debug!(line = line_idx + 1, percent, probability, "parsed binary probability");
    Ok(probability)
}

/// Soft-fail variant of [`parse_binary_probability`].
///
/// Returns [`BINARY_EXTRACTION_FAILED`] instead of an error, for callers that
/// treat a missing number as a routine "retry or discard" signal.
pub fn binary_probability_or_sentinel(content: &str) -> f64 {
    parse_binary_probability(content).unwrap_or(BINARY_EXTRACTION_FAILED)
}
