#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use forecast_harness::aggregate::aggregate_predictions;
use forecast_harness::extract::{parse_answer, parse_search_queries};
use forecast_harness::prompts::{
    format_research, render_forecast_prompt, render_search_query_prompt, PromptContext,
    ResearchArticle,
};
use forecast_harness::report::{build_report, render_report_markdown, DEFAULT_EXCERPT_CHARS};
use forecast_harness::Question;

#[derive(Parser)]
#[command(name = "forecast", version, about = "Forecast prompt and answer parsing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Md,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the forecasting prompt for a question
    Prompt {
        /// Question descriptor JSON
        #[arg(long)]
        question: PathBuf,
        /// Plain-text research notes to include
        #[arg(long, conflicts_with = "articles")]
        research: Option<PathBuf>,
        /// JSON array of news articles to format as research
        #[arg(long)]
        articles: Option<PathBuf>,
        /// Date written into the prompt (default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Render the search-query generation prompt instead
        #[arg(long)]
        search_queries: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Parse one model response into a structured prediction
    Parse {
        #[arg(long)]
        question: PathBuf,
        /// Raw model response text
        #[arg(long)]
        response: PathBuf,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        /// Characters of reasoning kept in the report
        #[arg(long, default_value_t = DEFAULT_EXCERPT_CHARS)]
        excerpt_chars: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Parse several responses to one question and aggregate them
    ///
    /// Responses that fail to parse are skipped with a warning; the command
    /// fails only if none parse.
    Aggregate {
        #[arg(long)]
        question: PathBuf,
        /// Raw model response files
        #[arg(long, num_args = 1.., required = true)]
        responses: Vec<PathBuf>,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        #[arg(long, default_value_t = DEFAULT_EXCERPT_CHARS)]
        excerpt_chars: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the search queries in a query-generation response
    Queries {
        #[arg(long)]
        response: PathBuf,
    },
}

fn load_question(path: &Path) -> Result<Question, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    Question::from_json(&raw).map_err(|e| format!("{}: {e}", path.display()).into())
}

fn emit(text: &str, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match out {
        Some(path) => {
            fs::write(path, text)?;
            eprintln!("[forecast] written to {}", path.display());
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prompt {
            question,
            research,
            articles,
            today,
            search_queries,
            out,
        } => {
            let question = load_question(&question)?;
            let mut ctx = match today {
                Some(date) => PromptContext::new(date),
                None => PromptContext::today(),
            };
            if let Some(path) = research {
                ctx = ctx.with_research(fs::read_to_string(path)?);
            } else if let Some(path) = articles {
                let parsed: Vec<ResearchArticle> =
                    serde_json::from_str(&fs::read_to_string(path)?)?;
                ctx = ctx.with_research(format_research(&parsed));
            }
            let prompt = if search_queries {
                render_search_query_prompt(&question, &ctx)
            } else {
                render_forecast_prompt(&question, &ctx)
            };
            emit(&prompt, out.as_deref())?;
        }
        Commands::Parse {
            question,
            response,
            format,
            excerpt_chars,
            out,
        } => {
            let question = load_question(&question)?;
            let text = fs::read_to_string(&response)?;
            let prediction = parse_answer(&text, &question)
                .map_err(|e| format!("{}: {e}", response.display()))?;
            let report = build_report(&question, &[text.as_str()], prediction, excerpt_chars);
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Md => render_report_markdown(&report),
            };
            emit(&rendered, out.as_deref())?;
        }
        Commands::Aggregate {
            question,
            responses,
            format,
            excerpt_chars,
            out,
        } => {
            let question = load_question(&question)?;
            let mut texts = Vec::new();
            let mut predictions = Vec::new();
            for path in &responses {
                let text = fs::read_to_string(path)?;
                match parse_answer(&text, &question) {
                    Ok(prediction) => {
                        predictions.push(prediction);
                        texts.push(text);
                    }
                    Err(err) => {
                        warn!(path = %path.display(), code = err.code(), error = %err, "skipping unparseable response");
                    }
                }
            }
            if predictions.is_empty() {
                return Err(format!("none of {} responses could be parsed", responses.len()).into());
            }
            let aggregated = aggregate_predictions(&predictions)?;
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let report = build_report(&question, &refs, aggregated, excerpt_chars);
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Md => render_report_markdown(&report),
            };
            emit(&rendered, out.as_deref())?;
        }
        Commands::Queries { response } => {
            let text = fs::read_to_string(&response)?;
            for query in parse_search_queries(&text)? {
                println!("{query}");
            }
        }
    }

    Ok(())
}
