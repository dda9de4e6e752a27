#![forbid(unsafe_code)]

//! # forecast-harness
//!
//! Turn free-text LLM forecasts into numbers a forecasting platform accepts.
//!
//! A forecasting bot prompts a model to reason about a question and finish with
//! an answer in a fixed textual shape (`Probability: 35%`,
//! `Probabilities: [10, 20, 70]`, or a `Distribution:` block of percentiles).
//! Models drift from that shape: they restate numbers, wrap them in Markdown,
//! use typographic dashes and fullwidth digits, or bury the block in prose.
//! This crate recovers the structured answer anyway, enforces its validity
//! invariants, and reports cleanly when there is nothing to recover.
//!
//! Question fetching, model calls, and submission live outside this crate; it
//! only consumes a [`Question`] descriptor and raw response text.

pub mod aggregate;
pub mod extract;
pub mod normalize;
pub mod prompts;
pub mod question;
pub mod report;

pub use aggregate::{aggregate_predictions, AggregateError};
pub use extract::{
    binary_probability_or_sentinel, parse_answer, ExtractError, PercentileDistribution,
    Prediction,
};
pub use normalize::clean_line;
pub use prompts::{render_forecast_prompt, PromptContext};
pub use question::{Question, QuestionType};
pub use report::{build_report, render_report_markdown, ForecastReport};
