//! Prompt templates for forecasting questions.
//!
//! Each template ends with the answer format the extractors in
//! [`crate::extract`] read back, so prompt and parser stay in lockstep.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::question::{Question, QuestionType};

// =============================================================================
// Render context
// =============================================================================

/// Per-call inputs that are not part of the question itself.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub research: Option<String>,
    pub today: NaiveDate,
}

impl PromptContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            research: None,
            today,
        }
    }

    /// Context dated with the local calendar day.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn with_research(mut self, research: impl Into<String>) -> Self {
        self.research = Some(research.into());
        self
    }
}

/// Percentiles requested from the model. All are on the extraction whitelist.
pub const PROMPT_PERCENTILES: [u8; 10] = [1, 5, 10, 20, 40, 60, 80, 90, 95, 99];

// =============================================================================
// Templates
// =============================================================================

/// A forecasting prompt with `{placeholder}` slots.
#[derive(Debug, Clone, Copy)]
pub struct ForecastPrompt {
    pub slug: &'static str,
    pub question_type: QuestionType,
    pub uses_research: bool,
    pub body: &'static str,
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("Invalid placeholder regex"));

static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("Invalid blank-line regex"));

impl ForecastPrompt {
    pub fn render(&self, question: &Question, ctx: &PromptContext) -> String {
        fill(self.body, self.question_type, question, ctx)
    }
}

/// Fill every `{placeholder}` in one pass over `body`.
///
/// Substituted text is never rescanned, so braces inside question or
/// research text come through literally. Unknown names are left as is.
fn fill(body: &str, answer_type: QuestionType, question: &Question, ctx: &PromptContext) -> String {
    let filled = PLACEHOLDER.replace_all(body, |caps: &regex::Captures<'_>| match &caps[1] {
        "question_text" => question.question_text.trim().to_string(),
        "background_info" => opt_text(&question.background_info).to_string(),
        "resolution_criteria" => opt_text(&question.resolution_criteria).to_string(),
        "fine_print" => opt_text(&question.fine_print).to_string(),
        "options" => render_options(&question.options),
        "units" => render_units(question),
        "bounds" => render_bounds(question),
        "research" => ctx.research.as_deref().unwrap_or("").trim().to_string(),
        "today" => ctx.today.format("%Y-%m-%d").to_string(),
        "answer_format" => answer_format(answer_type),
        _ => caps[0].to_string(),
    });
    BLANK_RUNS.replace_all(filled.trim(), "\n\n").into_owned()
}

fn opt_text(v: &Option<String>) -> &str {
    v.as_deref().map(str::trim).unwrap_or("")
}

fn render_options(options: &[String]) -> String {
    options
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. {}", i + 1, o.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_units(question: &Question) -> String {
    match &question.unit_of_measure {
        Some(unit) if !unit.trim().is_empty() => format!("Units for answer: {}", unit.trim()),
        _ => "Units for answer: not stated; infer them from the question.".to_string(),
    }
}

fn render_bounds(question: &Question) -> String {
    let lower = question.lower_bound.map(|lo| {
        if question.open_lower_bound {
            format!("The question creator thinks the number is likely not lower than {lo}.")
        } else {
            format!("The outcome can not be lower than {lo}.")
        }
    });
    let upper = question.upper_bound.map(|hi| {
        if question.open_upper_bound {
            format!("The question creator thinks the number is likely not higher than {hi}.")
        } else {
            format!("The outcome can not be higher than {hi}.")
        }
    });
    lower.into_iter().chain(upper).collect::<Vec<_>>().join("\n")
}

/// The closing answer block a template asks the model to emit.
pub fn answer_format(question_type: QuestionType) -> String {
    match question_type {
        QuestionType::Binary => "Probability: ZZ%".to_string(),
        QuestionType::MultipleChoice => {
            "Probabilities: [Probability_A, Probability_B, ..., Probability_N]".to_string()
        }
        QuestionType::Numeric | QuestionType::Discrete => {
            let mut out = String::from("Distribution:");
            for p in PROMPT_PERCENTILES {
                out.push_str(&format!("\nPercentile {p}: XX"));
            }
            out
        }
    }
}

macro_rules! preamble {
    () => {
        "You are a professional forecaster interviewing for a job.\n\nYour interview question is:\n{question_text}"
    };
}

macro_rules! criteria {
    () => {
        "Question background:\n{background_info}\n\nThis question's outcome will be determined by the specific criteria below. These criteria have not yet been satisfied:\n{resolution_criteria}\n\n{fine_print}"
    };
}

macro_rules! rationale {
    () => {
        "Today is {today}.\n\nBefore answering you write:\n(a) The time left until the outcome to the question is known.\n(b) The status quo outcome if nothing changed.\n(c) A brief description of a scenario that results in a No outcome.\n(d) A brief description of a scenario that results in a Yes outcome.\n\nYou write your rationale remembering that good forecasters put extra weight on the status quo outcome since the world changes slowly most of the time."
    };
}

macro_rules! research {
    () => {
        "Your research assistant was asked some relevant questions to research using the internet which are documented next. Please bear in mind that these are sourced from the internet and feel free to exercise skepticism based on the sources:\n{research}"
    };
}

macro_rules! structured_answer {
    ($note:literal) => {
        concat!(
            "------------------------------------------------------------------------\n\n",
            $note,
            "\n\nAnalysis:\n{Insert your analysis here, following the above components.}\n\nProbability calibration\n{Insert your calibration of your inside view prediction here.}\n\nChecklist:\n{Shortened, brief checklist verification here}\n\n{answer_format}"
        )
    };
}

macro_rules! final_answer {
    () => {
        "The last thing you write is your final answer in exactly the following format (or else automated parsing will be unable to read it):\n\n{answer_format}"
    };
}

pub const BINARY_RESEARCH_V1: ForecastPrompt = ForecastPrompt {
    slug: "binary_research_v1",
    question_type: QuestionType::Binary,
    uses_research: true,
    body: concat!(
        preamble!(),
        "\n\n",
        criteria!(),
        "\n\n",
        research!(),
        "\n\n",
        rationale!(),
        "\n\n",
        structured_answer!("Format your answer as below, it is very important to follow this format exactly, especially for the final probability, as a regex looking for 'Probability:' will be used to extract your answer."),
    ),
};

pub const BINARY_V1: ForecastPrompt = ForecastPrompt {
    slug: "binary_v1",
    question_type: QuestionType::Binary,
    uses_research: false,
    body: concat!(
        preamble!(),
        "\n\n",
        criteria!(),
        "\n\n",
        rationale!(),
        "\n\n",
        final_answer!(),
    ),
};

pub const MULTIPLE_CHOICE_RESEARCH_V1: ForecastPrompt = ForecastPrompt {
    slug: "multiple_choice_research_v1",
    question_type: QuestionType::MultipleChoice,
    uses_research: true,
    body: concat!(
        preamble!(),
        "\n\n",
        "The options are:\n{options}",
        "\n\n",
        criteria!(),
        "\n\n",
        research!(),
        "\n\n",
        rationale!(),
        "\n\n",
        structured_answer!("Format your answer as below and be sure to follow the formatting requirements else automated regex extraction will fail. List one probability per option, in the order the options are given, and nothing else inside the brackets."),
    ),
};

pub const MULTIPLE_CHOICE_V1: ForecastPrompt = ForecastPrompt {
    slug: "multiple_choice_v1",
    question_type: QuestionType::MultipleChoice,
    uses_research: false,
    body: concat!(
        preamble!(),
        "\n\n",
        "The options are:\n{options}",
        "\n\n",
        criteria!(),
        "\n\n",
        rationale!(),
        "\n\n",
        final_answer!(),
    ),
};

pub const NUMERIC_RESEARCH_V1: ForecastPrompt = ForecastPrompt {
    slug: "numeric_research_v1",
    question_type: QuestionType::Numeric,
    uses_research: true,
    body: concat!(
        preamble!(),
        "\n\n",
        criteria!(),
        "\n\n",
        "{units}\n{bounds}\nThink carefully, and reconsider your sources, if your projections are outside this range.",
        "\n\n",
        research!(),
        "\n\n",
        rationale!(),
        "\n\n",
        structured_answer!("**Essential formatting requirements**\n(a) For large numbers, please DO NOT output commas between numbers like 1,000,000. Instead, just write 1000000.\n(b) You MUST prefix the final percentiles with Distribution: as a regex will be programmed to read text below 'Distribution:'."),
    ),
};

pub const NUMERIC_V1: ForecastPrompt = ForecastPrompt {
    slug: "numeric_v1",
    question_type: QuestionType::Numeric,
    uses_research: false,
    body: concat!(
        preamble!(),
        "\n\n",
        criteria!(),
        "\n\n",
        "{units}\n{bounds}\nThink carefully if your projections are outside this range.",
        "\n\n",
        rationale!(),
        "\n\n",
        final_answer!(),
    ),
};

pub const SEARCH_QUERIES_V1: &str = concat!(
    "You are currently doing research for historical information on the below forecasting question.\n\n",
    "The forecasting question is:\n{question_text}\n\n",
    criteria!(),
    "\n\nToday is {today}.\n\n",
    "Your task is to analyze the forecasting question and write a series of search queries that will be used by your assistant to find relevant historical context and currently relevant developments or news articles.\n",
    "Keep each query to at most four sentences.\n\n",
    "You should format your answer exactly as below. Do not wrap your query in quotes. Include at least 2 but no more than 5 queries in decreasing order of relevance.\n\n",
    "Analysis:\n{Your initial impression of the forecasting question and the historical context needed for an outside view.}\n\n",
    "Search queries:\n1. [Query details]\n2. [Query details]\n3. [Query details]",
);

pub const PROMPTS: &[ForecastPrompt] = &[
    BINARY_RESEARCH_V1,
    BINARY_V1,
    MULTIPLE_CHOICE_RESEARCH_V1,
    MULTIPLE_CHOICE_V1,
    NUMERIC_RESEARCH_V1,
    NUMERIC_V1,
];

pub fn prompt_by_slug(slug: &str) -> Option<ForecastPrompt> {
    PROMPTS.iter().find(|t| t.slug == slug).copied()
}

/// Default template for a question type; discrete questions share the numeric one.
pub fn prompt_for(question_type: QuestionType, with_research: bool) -> ForecastPrompt {
    match (question_type, with_research) {
        (QuestionType::Binary, true) => BINARY_RESEARCH_V1,
        (QuestionType::Binary, false) => BINARY_V1,
        (QuestionType::MultipleChoice, true) => MULTIPLE_CHOICE_RESEARCH_V1,
        (QuestionType::MultipleChoice, false) => MULTIPLE_CHOICE_V1,
        (QuestionType::Numeric | QuestionType::Discrete, true) => NUMERIC_RESEARCH_V1,
        (QuestionType::Numeric | QuestionType::Discrete, false) => NUMERIC_V1,
    }
}

/// Render the default forecasting prompt for `question`.
///
/// The research variant is chosen when `ctx` carries non-empty research.
pub fn render_forecast_prompt(question: &Question, ctx: &PromptContext) -> String {
    let with_research = ctx
        .research
        .as_deref()
        .is_some_and(|r| !r.trim().is_empty());
    prompt_for(question.question_type, with_research).render(question, ctx)
}

/// Render the search-query generation prompt for `question`.
pub fn render_search_query_prompt(question: &Question, ctx: &PromptContext) -> String {
    fill(SEARCH_QUERIES_V1, question.question_type, question, ctx)
}

// =============================================================================
// Research formatting
// =============================================================================

/// A news article summary as returned by a news-search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchArticle {
    #[serde(alias = "eng_title")]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, alias = "pub_date")]
    pub published: Option<String>,
    #[serde(default, alias = "source_id")]
    pub source: Option<String>,
    #[serde(default, alias = "article_url")]
    pub url: Option<String>,
}

/// Format one article as a Markdown research block.
pub fn format_article(article: &ResearchArticle) -> String {
    let mut out = format!("**{}**\n{}\n", article.title.trim(), article.summary.trim());
    if let Some(lang) = &article.language {
        out.push_str(&format!("Original language: {lang}\n"));
    }
    if let Some(date) = &article.published {
        out.push_str(&format!("Publish date: {date}\n"));
    }
    match (&article.source, &article.url) {
        (Some(source), Some(url)) => out.push_str(&format!("Source:[{source}]({url})\n")),
        (Some(source), None) => out.push_str(&format!("Source: {source}\n")),
        (None, Some(url)) => out.push_str(&format!("Source: {url}\n")),
        (None, None) => {}
    }
    out
}

/// Join articles into one research string, blank line between entries.
pub fn format_research(articles: &[ResearchArticle]) -> String {
    articles
        .iter()
        .map(format_article)
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::is_valid_percentile_key;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn binary_prompt_ends_with_probability_format() {
        let q = Question::binary("Will X happen by 2026?");
        let p = render_forecast_prompt(&q, &PromptContext::new(date()));
        assert!(p.contains("Will X happen by 2026?"));
        assert!(p.contains("Today is 2025-09-01."));
        assert!(p.trim_end().ends_with("Probability: ZZ%"));
        assert!(!p.contains("research assistant"));
    }

    #[test]
    fn research_selects_research_template() {
        let q = Question::binary("Will X happen?");
        let ctx = PromptContext::new(date()).with_research("Article: X is delayed.");
        let p = render_forecast_prompt(&q, &ctx);
        assert!(p.contains("research assistant"));
        assert!(p.contains("Article: X is delayed."));
        assert!(p.contains("Checklist:"));

        let blank = PromptContext::new(date()).with_research("   ");
        assert!(!render_forecast_prompt(&q, &blank).contains("research assistant"));
    }

    #[test]
    fn multiple_choice_lists_options_in_order() {
        let q = Question::multiple_choice("Who wins?", ["Alpha", "Beta", "Gamma"]);
        let p = render_forecast_prompt(&q, &PromptContext::new(date()));
        let a = p.find("1. Alpha").unwrap();
        let b = p.find("2. Beta").unwrap();
        let c = p.find("3. Gamma").unwrap();
        assert!(a < b && b < c);
        assert!(p.contains("Probabilities: [Probability_A"));
    }

    #[test]
    fn numeric_prompt_has_bounds_and_distribution() {
        let mut q = Question::numeric("How many?").with_bounds(0.0, 500.0).with_unit("launches");
        q.open_upper_bound = true;
        let p = render_forecast_prompt(&q, &PromptContext::new(date()));
        assert!(p.contains("Units for answer: launches"));
        assert!(p.contains("can not be lower than 0"));
        assert!(p.contains("likely not higher than 500"));
        assert!(p.contains("Distribution:\nPercentile 1: XX"));
        assert!(p.trim_end().ends_with("Percentile 99: XX"));
    }

    #[test]
    fn discrete_shares_numeric_template() {
        assert_eq!(prompt_for(QuestionType::Discrete, false).slug, "numeric_v1");
        assert_eq!(prompt_for(QuestionType::Discrete, true).slug, "numeric_research_v1");
    }

    #[test]
    fn prompt_percentiles_are_extractable() {
        assert!(PROMPT_PERCENTILES
            .iter()
            .all(|k| is_valid_percentile_key(u32::from(*k))));
    }

    #[test]
    fn missing_fields_do_not_leave_placeholders() {
        let q = Question::numeric("How many?");
        for template in PROMPTS {
            let ctx = PromptContext::new(date()).with_research("notes");
            let p = template.render(&q, &ctx);
            for slot in [
                "{question_text}",
                "{background_info}",
                "{resolution_criteria}",
                "{fine_print}",
                "{options}",
                "{units}",
                "{bounds}",
                "{research}",
                "{today}",
                "{answer_format}",
            ] {
                assert!(!p.contains(slot), "{} left {slot}", template.slug);
            }
            assert!(!p.contains("\n\n\n"), "{} has blank runs", template.slug);
        }
    }

    #[test]
    fn braces_in_user_text_are_not_expanded() {
        let q = Question::binary("Will {today} stay literal?");
        let ctx = PromptContext::new(date()).with_research("Quoting a template: {answer_format}");
        let p = render_forecast_prompt(&q, &ctx);
        assert!(p.contains("Will {today} stay literal?"));
        assert!(p.contains("Quoting a template: {answer_format}"));
        assert_eq!(p.matches("Probability: ZZ%").count(), 1);

        let s = render_search_query_prompt(&q, &ctx);
        assert!(s.contains("Will {today} stay literal?"));
    }

    #[test]
    fn prompt_lookup() {
        assert!(prompt_by_slug("binary_v1").is_some());
        assert!(prompt_by_slug("nonexistent").is_none());
    }

    #[test]
    fn search_query_prompt() {
        let q = Question::binary("Will X happen?");
        let p = render_search_query_prompt(&q, &PromptContext::new(date()));
        assert!(p.contains("Will X happen?"));
        assert!(p.ends_with("3. [Query details]"));
    }

    #[test]
    fn article_formatting() {
        let raw = r#"{"eng_title": "Launch slips", "summary": "Delayed to Q3.", "language": "en", "pub_date": "2025-08-30", "source_id": "wire", "article_url": "https://example.com/a"}"#;
        let article: ResearchArticle = serde_json::from_str(raw).unwrap();
        let text = format_article(&article);
        assert!(text.starts_with("**Launch slips**\nDelayed to Q3.\n"));
        assert!(text.contains("Publish date: 2025-08-30"));
        assert!(text.contains("Source:[wire](https://example.com/a)"));

        let joined = format_research(&[article.clone(), article]);
        assert_eq!(joined.matches("**Launch slips**").count(), 2);
    }
}
