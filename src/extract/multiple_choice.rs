//! Multiple-choice forecasts: "Probabilities: [p1, p2, ...]".

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::error::{ExtractError, PROBABILITIES_MARKER};

/// Clamp range when the model answers on a 0–100 scale.
const PERCENT_RANGE: (f64, f64) = (1.0, 99.0);
/// Clamp range when the model answers with fractions.
const FRACTION_RANGE: (f64, f64) = (0.01, 0.99);

static PROBABILITIES_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Probabilities:\s*\[([0-9.,\s]+)\]").expect("Invalid probabilities regex")
});

/// Extract the raw values of the last probability list in `content`.
///
/// `expected` is the number of options on the question; `None` skips the
/// length check.
pub fn extract_option_probabilities(
    content: &str,
    expected: Option<usize>,
) -> Result<Vec<f64>, ExtractError> {
    let body = PROBABILITIES_LIST
        .captures_iter(content)
        .last()
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ExtractError::missing(PROBABILITIES_MARKER))?
        .as_str();

    let values = body
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|e| ExtractError::invalid_number(s, e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err(ExtractError::EmptyProbabilityList);
    }
    if let Some(expected) = expected {
        if values.len() != expected {
            return Err(ExtractError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
    }

    debug!(count = values.len(), "extracted option probabilities");
    Ok(values)
}

/// Map raw option values onto the probability simplex.
///
/// Any value above 1 means the whole list is read as percentages. Each value is
/// clamped away from 0 and certainty before dividing by the total, and the
/// last entry absorbs the rounding residual so the vector sums to 1.
///
/// The scale is decided for the whole list; a fractional list with one stray
/// percentage is read as percentages.
pub fn normalize_probabilities(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if max > 1.0 {
        PERCENT_RANGE
    } else {
        FRACTION_RANGE
    };

    let clamped: Vec<f64> = values.iter().map(|p| p.clamp(lo, hi)).collect();
    let total: f64 = clamped.iter().sum();
    let mut normed: Vec<f64> = clamped.iter().map(|p| p / total).collect();

    let residual = 1.0 - normed.iter().sum::<f64>();
    if let Some(last) = normed.last_mut() {
        *last += residual;
    }
    normed
}

/// Extract and normalize a multiple-choice forecast.
pub fn parse_multiple_choice(
    content: &str,
    expected: Option<usize>,
) -> Result<Vec<f64>, ExtractError> {
    let raw = extract_option_probabilities(content, expected)?;
    Ok(normalize_probabilities(&raw))
}
