//! Input Summarizer command line

use anyhow::Context;
use clap::Parser;
use input_summarizer::{
    batch::{BatchOrchestrator, LogProgress},
    budget::ReductionSpec,
    config::Config,
    dataset::{self, OutputFormat},
    generation::ChatCompletionClient,
    models::ModelRegistry,
    observability::init_observability,
    summarizer::{Summarizer, SummarizerOptions},
    tokenizer::TokenizerAdapter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Batch-summarize JSON/JSONL examples towards a token budget.
///
/// Options given here override the configuration file. `OPENAI_API_KEY`
/// is used when no config file sets an API key, and
/// `INPUT_SUMMARIZER__<SECTION>__<KEY>` overrides config file values.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file (.json array or .jsonl, one object per line)
    input: PathBuf,

    /// TOML configuration file
    #[arg(short = 'c', long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Model profile, e.g. gpt-3.5-turbo, gpt-4, gpt-4-turbo
    #[arg(short, long)]
    model: Option<String>,

    /// Percentage of tokens to remove (10-90 typical)
    #[arg(short, long, value_name = "PCT", value_parser = parse_remove_percent, conflicts_with = "keep_ratio")]
    reduction: Option<ReductionSpec>,

    /// Fraction of tokens to keep (0.1-1.0 typical)
    #[arg(short = 'k', long, value_name = "RATIO", value_parser = parse_keep_ratio)]
    keep_ratio: Option<ReductionSpec>,

    /// Process at most N examples
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..), conflicts_with = "no_limit")]
    limit: Option<u64>,

    /// Process every example, ignoring any configured limit
    #[arg(long)]
    no_limit: bool,

    /// Result file format: json or jsonl
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Directory for the result file
    #[arg(short, long, value_name = "DIR")]
    out: Option<String>,
}

fn parse_remove_percent(raw: &str) -> Result<ReductionSpec, String> {
    let percent: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    ReductionSpec::remove_percent(percent).map_err(|e| e.to_string())
}

fn parse_keep_ratio(raw: &str) -> Result<ReductionSpec, String> {
    let ratio: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    ReductionSpec::keep_ratio(ratio).map_err(|e| e.to_string())
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.summarizer.model = model.clone();
        }
        if let Some(reduction) = self.reduction.or(self.keep_ratio) {
            config.summarizer.reduction = reduction;
        }
        if let Some(limit) = self.limit {
            config.summarizer.limit = Some(limit as usize);
        } else if self.no_limit {
            config.summarizer.limit = None;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(out) = &self.out {
            config.output.dir = out.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default_config(),
    };
    cli.apply(&mut config);
    config.validate()?;

    init_observability(&config.logging.level, &config.logging.format);
    info!("Starting input summarizer with model {}", config.summarizer.model);

    let registry = Arc::new(ModelRegistry::from_profiles(&config.models)?);
    let tokenizer = Arc::new(TokenizerAdapter::new(registry));
    let generator = Arc::new(ChatCompletionClient::new(config.generation.clone())?);
    let summarizer = Arc::new(Summarizer::new(
        generator,
        tokenizer,
        SummarizerOptions {
            max_tokens_margin: config.generation.max_tokens_margin,
            temperature: config.generation.temperature,
            language: config.summarizer.prompt_language,
        },
    ));
    let orchestrator = BatchOrchestrator::new(summarizer)
        .with_max_concurrency(config.summarizer.max_concurrency);

    let records = dataset::load_records(&cli.input)?;
    let outcome = orchestrator
        .run_batch(
            &records,
            &config.summarizer.model,
            &config.summarizer.reduction,
            config.summarizer.limit,
            &LogProgress,
        )
        .await?;

    for line in &outcome.log {
        println!("{}", line);
    }

    let metrics = &outcome.metrics;
    println!();
    println!(
        "Done summarizing {} examples: {} succeeded, {} failed, {} empty ({:.1}% ok)",
        metrics.processed,
        metrics.succeeded,
        metrics.failed,
        metrics.skipped,
        metrics.success_rate() * 100.0
    );
    for (index, result) in outcome.results.iter().enumerate() {
        if result.is_failure() {
            println!("  #{} failed: {}", index + 1, result.error.as_deref().unwrap_or("unknown"));
        }
    }
    println!(
        "Tokens: {} prompt / {} completion",
        metrics.total_prompt_tokens, metrics.total_completion_tokens
    );
    println!("Total estimated cost: ${:.4}", metrics.total_cost);

    let path = dataset::write_results(&config.output.dir, &outcome.results, config.output.format)?;
    println!("Results written to {}", path.display());

    Ok(())
}
