//! Question descriptors consumed by the prompt and extraction layers.

use serde::{Deserialize, Serialize};

/// Kind of forecast a question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Binary,
    Numeric,
    Discrete,
    MultipleChoice,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Numeric => "numeric",
            Self::Discrete => "discrete",
            Self::MultipleChoice => "multiple_choice",
        }
    }

    /// Numeric and discrete questions are both answered with a percentile distribution.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::Numeric | Self::Discrete)
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A forecasting question as handed over by the orchestration layer.
///
/// Only `question_type` and `options` drive extraction; the remaining fields
/// feed prompt rendering and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_type: QuestionType,

    /// Ordered option labels (multiple choice only).
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub background_info: Option<String>,
    #[serde(default)]
    pub resolution_criteria: Option<String>,
    #[serde(default)]
    pub fine_print: Option<String>,

    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub lower_bound: Option<f64>,
    #[serde(default)]
    pub upper_bound: Option<f64>,
    #[serde(default)]
    pub open_lower_bound: bool,
    #[serde(default)]
    pub open_upper_bound: bool,

    #[serde(default)]
    pub page_url: Option<String>,
}

impl Question {
    /// Minimal descriptor carrying only what extraction needs.
    pub fn new(question_type: QuestionType) -> Self {
        Self {
            question_type,
            options: Vec::new(),
            question_text: String::new(),
            background_info: None,
            resolution_criteria: None,
            fine_print: None,
            unit_of_measure: None,
            lower_bound: None,
            upper_bound: None,
            open_lower_bound: false,
            open_upper_bound: false,
            page_url: None,
        }
    }

    pub fn binary(text: impl Into<String>) -> Self {
        Self::new(QuestionType::Binary).with_text(text)
    }

    pub fn multiple_choice<I, S>(text: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut q = Self::new(QuestionType::MultipleChoice).with_text(text);
        q.options = options.into_iter().map(Into::into).collect();
        q
    }

    pub fn numeric(text: impl Into<String>) -> Self {
        Self::new(QuestionType::Numeric).with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.question_text = text.into();
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = Some(lower);
        self.upper_bound = Some(upper);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measure = Some(unit.into());
        self
    }

    /// Expected length of a multiple-choice probability vector, if known.
    pub fn expected_option_count(&self) -> Option<usize> {
        if self.options.is_empty() {
            None
        } else {
            Some(self.options.len())
        }
    }

    /// Load a descriptor from its JSON form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_snake_case_type_and_defaults() {
        let raw = r#"{"question_type": "multiple_choice", "options": ["a", "b", "c"]}"#;
        let q = Question::from_json(raw).unwrap();
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.expected_option_count(), Some(3));
        assert!(q.question_text.is_empty());
        assert!(!q.open_upper_bound);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(Question::from_json(r#"{"question_type": "date"}"#).is_err());
    }

    #[test]
    fn no_options_means_unknown_count() {
        assert_eq!(Question::binary("Will it rain?").expected_option_count(), None);
    }

    #[test]
    fn continuous_types() {
        assert!(QuestionType::Numeric.is_continuous());
        assert!(QuestionType::Discrete.is_continuous());
        assert!(!QuestionType::Binary.is_continuous());
        assert_eq!(QuestionType::MultipleChoice.to_string(), "multiple_choice");
    }
}
