//! Combine several parsed forecasts for the same question.
//!
//! A question is usually forecast more than once (several research reports,
//! several samples per report). Binary forecasts and percentiles combine by
//! median, which is robust to a single wild sample; option vectors combine by
//! mean and are re-normalized.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::extract::{
    normalize_probabilities, PercentileDistribution, Prediction, BINARY_MAX, BINARY_MIN,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("no predictions to aggregate")]
    Empty,
    #[error("cannot aggregate {first} prediction with {other} prediction")]
    MixedKinds {
        first: &'static str,
        other: &'static str,
    },
    #[error("probability vectors differ in length: {expected} vs {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Median of binary forecasts, clamped like a single forecast.
pub fn aggregate_binary(predictions: &[f64]) -> Result<f64, AggregateError> {
    let mut values = predictions.to_vec();
    median(&mut values)
        .map(|m| m.clamp(BINARY_MIN, BINARY_MAX))
        .ok_or(AggregateError::Empty)
}

/// Per-option mean of probability vectors, re-normalized to sum to 1.
pub fn aggregate_multiple_choice(predictions: &[Vec<f64>]) -> Result<Vec<f64>, AggregateError> {
    let first = predictions.first().ok_or(AggregateError::Empty)?;
    let width = first.len();
    if let Some(bad) = predictions.iter().find(|p| p.len() != width) {
        return Err(AggregateError::LengthMismatch {
            expected: width,
            actual: bad.len(),
        });
    }

    let n = predictions.len() as f64;
    let means: Vec<f64> = (0..width)
        .map(|i| predictions.iter().map(|p| p[i]).sum::<f64>() / n)
        .collect();
    Ok(normalize_probabilities(&means))
}

/// Per-key median over the distributions that declare that key.
pub fn aggregate_percentiles(
    predictions: &[PercentileDistribution],
) -> Result<PercentileDistribution, AggregateError> {
    if predictions.is_empty() {
        return Err(AggregateError::Empty);
    }

    let mut by_key: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
    for dist in predictions {
        for (key, value) in dist.iter() {
            by_key.entry(key).or_default().push(value);
        }
    }

    Ok(by_key
        .into_iter()
        .filter_map(|(key, mut values)| median(&mut values).map(|m| (key, m)))
        .collect())
}

/// Aggregate predictions of one kind.
pub fn aggregate_predictions(predictions: &[Prediction]) -> Result<Prediction, AggregateError> {
    let first = predictions.first().ok_or(AggregateError::Empty)?;
    if let Some(other) = predictions.iter().find(|p| p.kind() != first.kind()) {
        warn!(first = first.kind(), other = other.kind(), "mixed prediction kinds");
        return Err(AggregateError::MixedKinds {
            first: first.kind(),
            other: other.kind(),
        });
    }

    match first {
        Prediction::Binary(_) => {
            let values: Vec<f64> = predictions.iter().filter_map(Prediction::as_binary).collect();
            aggregate_binary(&values).map(Prediction::Binary)
        }
        Prediction::MultipleChoice(_) => {
            let vectors: Vec<Vec<f64>> = predictions
                .iter()
                .filter_map(|p| p.as_multiple_choice().map(<[f64]>::to_vec))
                .collect();
            aggregate_multiple_choice(&vectors).map(Prediction::MultipleChoice)
        }
        Prediction::Percentiles(_) => {
            let dists: Vec<PercentileDistribution> = predictions
                .iter()
                .filter_map(|p| p.as_percentiles().cloned())
                .collect();
            aggregate_percentiles(&dists).map(Prediction::Percentiles)
        }
    }
}
