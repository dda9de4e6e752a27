//! Numeric and discrete forecasts: a percentile block after "Distribution:".
//!
//! The block is read with a two-state scan. Lines are ignored until one
//! contains the anchor; from then on every line that looks like
//! `percentile K: V`, `K: V` or `K - V` is recorded, and everything else
//! (prose, out-of-whitelist keys, garbled numbers) is skipped. Collection never
//! stops once started, so a second `Distribution:` block overwrites repeated
//! keys from the first.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::{ExtractError, DISTRIBUTION_MARKER};
use crate::normalize::clean_line;

/// Percentile keys a forecast may declare.
pub const PERCENTILE_KEYS: [u8; 21] = [
    1, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95, 99,
];

/// Anchor as it appears after [`clean_line`].
const ANCHOR: &str = "distribution:";

static PERCENTILE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:percentile\s*)?([0-9]{1,3})\s*[:\-]\s*([+-]?[0-9]+(?:\.[0-9]+)?(?:e[+-]?[0-9]+)?)\s*$",
    )
    .expect("Invalid percentile line regex")
});

pub fn is_valid_percentile_key(key: u32) -> bool {
    u8::try_from(key).is_ok_and(|k| PERCENTILE_KEYS.contains(&k))
}

/// Percentile key → forecast value.
///
/// Keys are always whitelisted but not every whitelisted key need be present.
/// Values are stored as written; nothing forces P10 ≤ P90.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PercentileDistribution(BTreeMap<u8, f64>);

impl PercentileDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; returns `false` (and ignores it) for a key outside the whitelist.
    pub fn insert(&mut self, key: u8, value: f64) -> bool {
        if !PERCENTILE_KEYS.contains(&key) {
            return false;
        }
        self.0.insert(key, value);
        true
    }

    pub fn get(&self, key: u8) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.keys().copied()
    }

    /// Whether values are non-decreasing in key order.
    pub fn is_monotonic(&self) -> bool {
        let values: Vec<f64> = self.0.values().copied().collect();
        values.windows(2).all(|w| w[0] <= w[1])
    }
}

impl FromIterator<(u8, f64)> for PercentileDistribution {
    fn from_iter<T: IntoIterator<Item = (u8, f64)>>(iter: T) -> Self {
        let mut dist = Self::new();
        for (k, v) in iter {
            dist.insert(k, v);
        }
        dist
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingAnchor,
    Collecting,
}

/// Extract a percentile distribution from a full response.
pub fn extract_percentiles(content: &str) -> Result<PercentileDistribution, ExtractError> {
    extract_percentiles_from_lines(content.lines())
}

/// Extract a percentile distribution from pre-split lines.
pub fn extract_percentiles_from_lines<I, S>(lines: I) -> Result<PercentileDistribution, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut state = ScanState::SeekingAnchor;
    let mut dist = PercentileDistribution::new();

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line = clean_line(raw.as_ref());

        match state {
            ScanState::SeekingAnchor => {
                if line.contains(ANCHOR) {
                    debug!(line = line_no, "found distribution anchor");
                    state = ScanState::Collecting;
                }
                continue;
            }
            ScanState::Collecting => {}
        }

        let Some((key, value)) = parse_percentile_line(&line) else {
            trace!(line = line_no, text = %line, "skipping non-percentile line");
            continue;
        };
        if dist.insert(key, value) {
            debug!(line = line_no, percentile = key, value, "matched percentile");
        } else {
            trace!(line = line_no, percentile = key, "skipping percentile outside whitelist");
        }
    }

    match state {
        ScanState::SeekingAnchor => Err(ExtractError::missing(DISTRIBUTION_MARKER)),
        ScanState::Collecting if dist.is_empty() => Err(ExtractError::NoPercentiles),
        ScanState::Collecting => Ok(dist),
    }
}

/// Match one cleaned line against the percentile pattern.
///
/// Keys that do not fit in `u8` are returned as `None`; they can never be
/// whitelisted anyway.
fn parse_percentile_line(line: &str) -> Option<(u8, f64)> {
    let caps = PERCENTILE_LINE.captures(line)?;
    let key: u8 = caps.get(1)?.as_str().parse().ok()?;
    let value: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some((key, value))
}
