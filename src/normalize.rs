//! Line canonicalization applied before structural matching.
//!
//! Model output is full of typographic noise: fullwidth digits, en/em dashes
//! used as separators, bullet glyphs, grouped thousands. `clean_line` folds all
//! of it into a plain lower-case ASCII-ish line so the extractors only need to
//! recognize one spelling of each pattern.

use unicode_normalization::UnicodeNormalization;

/// Hyphen variants, en/em dash, horizontal bar and the minus sign.
pub const DASH_CHARS: &[char] = &[
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}',
];

/// Markers stripped from the start of a line (never from its interior).
pub const BULLET_CHARS: &[char] = &['•', '▪', '●', '‣', '–', '*', '-'];

/// No-break spaces used as thousands separators ("1 000").
///
/// NFKC folds these into U+0020, so they are removed before folding.
const NO_BREAK_SPACES: &[char] = &['\u{00A0}', '\u{202F}', '\u{2007}'];

/// Canonicalize one line of raw model output.
///
/// Total over all inputs. Applying it twice yields the same line as applying
/// it once.
pub fn clean_line(raw: &str) -> String {
    let without_nbsp: String = raw.chars().filter(|c| !NO_BREAK_SPACES.contains(c)).collect();

    let folded: String = without_nbsp
        .nfkc()
        .map(|c| if DASH_CHARS.contains(&c) { '-' } else { c })
        .collect();

    let without_commas: String = strip_bullets(&folded)
        .chars()
        .filter(|&c| c != ',')
        .collect();

    // Dropping commas can expose a new leading bullet (",- 10: 5").
    strip_bullets(&without_commas).to_lowercase()
}

fn strip_bullets(s: &str) -> &str {
    s.trim()
        .trim_start_matches(|c: char| c.is_whitespace() || BULLET_CHARS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bullet_and_lowercases() {
        assert_eq!(clean_line("• Percentile 25 - 42.5"), "percentile 25 - 42.5");
        assert_eq!(clean_line("  * Percentile 10: 5  "), "percentile 10: 5");
        assert_eq!(clean_line("- - 50: 3"), "50: 3");
    }

    #[test]
    fn bullets_only_stripped_at_start() {
        assert_eq!(clean_line("a • b * c - d"), "a • b * c - d");
    }

    #[test]
    fn typographic_dashes_become_hyphens() {
        assert_eq!(clean_line("Percentile 90 — 100"), "percentile 90 - 100");
        assert_eq!(clean_line("10 \u{2212} 3"), "10 - 3");
        assert_eq!(clean_line("10\u{2011}3"), "10-3");
    }

    #[test]
    fn thousands_separators_removed() {
        assert_eq!(clean_line("Percentile 50: 1,000,000"), "percentile 50: 1000000");
        assert_eq!(clean_line("Percentile 50: 1\u{00A0}000"), "percentile 50: 1000");
        assert_eq!(clean_line("Percentile 50: 1\u{202F}000"), "percentile 50: 1000");
    }

    #[test]
    fn compatibility_forms_fold() {
        // Fullwidth digits and colon.
        assert_eq!(clean_line("Ｐercentile ５０：２０"), "percentile 50:20");
        assert_eq!(clean_line("Distribution:"), "distribution:");
    }

    #[test]
    fn comma_removal_exposes_bullet() {
        assert_eq!(clean_line(",- 10: 5"), "10: 5");
    }

    #[test]
    fn idempotent_on_normalized_lines() {
        let samples = [
            "• Percentile 25 - 42.5",
            "  ▪ ● Percentile 90 — 1,250 ",
            "Probability: **35%**",
            "Distribution:",
            "‣ 5: -3.2e4",
            "Ｐercentile ５０：２０",
            "",
            "   ",
            ",,-*",
        ];
        for s in samples {
            let once = clean_line(s);
            assert_eq!(clean_line(&once), once, "not a fixed point for {s:?}");
        }
    }

    #[test]
    fn empty_and_blank_lines() {
        assert_eq!(clean_line(""), "");
        assert_eq!(clean_line(" \t "), "");
        assert_eq!(clean_line("•"), "");
    }
}
