//! Answer extraction from free-text forecasts.
//!
//! One extractor per answer format, plus a dispatcher keyed on the question
//! type:
//! - Binary: last `Probability: NN%` line
//! - Multiple choice: last `Probabilities: [..]` list
//! - Numeric/discrete: percentile lines after `Distribution:`
//!
//! `search_queries` reads the research-query list of the query generation
//! prompt; it is not dispatched on question type.

pub mod binary;
pub mod error;
pub mod multiple_choice;
pub mod percentile;
pub mod search_queries;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::question::{Question, QuestionType};

pub use binary::{
    binary_probability_or_sentinel, parse_binary_probability, BINARY_EXTRACTION_FAILED,
    BINARY_MAX, BINARY_MIN,
};
pub use error::ExtractError;
pub use multiple_choice::{
    extract_option_probabilities, normalize_probabilities, parse_multiple_choice,
};
pub use percentile::{
    extract_percentiles, extract_percentiles_from_lines, is_valid_percentile_key,
    PercentileDistribution, PERCENTILE_KEYS,
};
pub use search_queries::{parse_search_queries, MAX_SEARCH_QUERIES};

/// A structured forecast recovered from model text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "question_type", content = "prediction", rename_all = "snake_case")]
pub enum Prediction {
    /// Probability of "yes", in `[0.01, 0.99]`.
    Binary(f64),
    /// One probability per option, in option order, summing to 1.
    MultipleChoice(Vec<f64>),
    /// Declared percentiles of a numeric or discrete quantity.
    Percentiles(PercentileDistribution),
}

impl Prediction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Binary(_) => "binary",
            Self::MultipleChoice(_) => "multiple_choice",
            Self::Percentiles(_) => "percentiles",
        }
    }

    pub fn as_binary(&self) -> Option<f64> {
        match self {
            Self::Binary(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_multiple_choice(&self) -> Option<&[f64]> {
        match self {
            Self::MultipleChoice(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_percentiles(&self) -> Option<&PercentileDistribution> {
        match self {
            Self::Percentiles(d) => Some(d),
            _ => None,
        }
    }
}

/// Parse a model response according to the question's type.
pub fn parse_answer(content: &str, question: &Question) -> Result<Prediction, ExtractError> {
    debug!(question_type = %question.question_type, "parsing forecast response");
    match question.question_type {
        QuestionType::Binary => parse_binary_probability(content).map(Prediction::Binary),
        QuestionType::Numeric | QuestionType::Discrete => {
            extract_percentiles(content).map(Prediction::Percentiles)
        }
        QuestionType::MultipleChoice => {
            parse_multiple_choice(content, question.expected_option_count())
                .map(Prediction::MultipleChoice)
        }
    }
}
