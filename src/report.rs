//! Report generation for parsed forecasts.

use serde::Serialize;

use crate::extract::Prediction;
use crate::question::{Question, QuestionType};

/// Characters of the raw response kept in a report.
pub const DEFAULT_EXCERPT_CHARS: usize = 600;

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub question_type: QuestionType,
    pub question_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    /// blake3 of the raw response text the prediction was parsed from.
    pub response_hash: String,
    pub response_count: usize,
    pub prediction: Prediction,
    /// Option label → probability, for multiple-choice forecasts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ReportOption>,
    /// `Some(false)` flags a percentile block whose values decrease somewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentiles_monotonic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_excerpt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportOption {
    pub label: String,
    pub probability: f64,
}

/// Build a report for a prediction parsed from one or more responses.
pub fn build_report(
    question: &Question,
    responses: &[&str],
    prediction: Prediction,
    excerpt_chars: usize,
) -> ForecastReport {
    let options = match prediction.as_multiple_choice() {
        Some(probs) => question
            .options
            .iter()
            .zip(probs)
            .map(|(label, p)| ReportOption {
                label: label.clone(),
                probability: *p,
            })
            .collect(),
        None => Vec::new(),
    };
    let percentiles_monotonic = prediction.as_percentiles().map(|d| d.is_monotonic());
    let reasoning_excerpt = responses
        .last()
        .map(|r| excerpt(r, excerpt_chars))
        .filter(|e| !e.is_empty());

    ForecastReport {
        question_type: question.question_type,
        question_text: question.question_text.clone(),
        page_url: question.page_url.clone(),
        response_hash: hash_responses(responses),
        response_count: responses.len(),
        prediction,
        options,
        percentiles_monotonic,
        reasoning_excerpt,
    }
}

pub fn render_report_markdown(report: &ForecastReport) -> String {
    let mut out = String::new();
    out.push_str("# Forecast Report\n\n");
    if !report.question_text.is_empty() {
        out.push_str(&format!("- Question: {}\n", report.question_text));
    }
    if let Some(url) = &report.page_url {
        out.push_str(&format!("- URL: {}\n", url));
    }
    out.push_str(&format!("- Type: {}\n", report.question_type));
    out.push_str(&format!("- Responses: {}\n", report.response_count));
    out.push_str(&format!("- Response hash: `{}`\n", report.response_hash));

    out.push_str("\n## Prediction\n\n");
    match &report.prediction {
        Prediction::Binary(p) => {
            out.push_str(&format!("- Probability: {:.1}%\n", p * 100.0));
        }
        Prediction::MultipleChoice(probs) => {
            if report.options.is_empty() {
                for (i, p) in probs.iter().enumerate() {
                    out.push_str(&format!("- Option {}: {:.1}%\n", i + 1, p * 100.0));
                }
            } else {
                for opt in &report.options {
                    out.push_str(&format!("- {}: {:.1}%\n", opt.label, opt.probability * 100.0));
                }
            }
        }
        Prediction::Percentiles(dist) => {
            for (key, value) in dist.iter() {
                out.push_str(&format!("- P{}: {}\n", key, value));
            }
            if report.percentiles_monotonic == Some(false) {
                out.push_str("\nWarning: percentile values are not non-decreasing.\n");
            }
        }
    }

    if let Some(excerpt) = &report.reasoning_excerpt {
        out.push_str("\n## Reasoning (excerpt)\n\n");
        for line in excerpt.lines() {
            out.push_str(&format!("> {}\n", line));
        }
    }

    out
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

fn hash_responses(responses: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in responses {
        hasher.update(r.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex().to_string()
}
