//! Input Summarizer - batch summarization of text examples with token budgets
//!
//! This library shortens collections of text records through a chat
//! completion service, aiming each summary at a token budget derived from a
//! reduction target, and reports the tokens actually consumed together with
//! an estimated cost.
//!
//! ## Pipeline
//!
//! - **Tokenizer Adapter**: model-aware token counting (`tiktoken-rs` encodings or heuristics)
//! - **Budget Planner**: reduction percentage / keep ratio to a target token count
//! - **Summarization Invoker**: prompt, call, measure; failures become data
//! - **Cost Model**: per-1K token rates from the model profile table
//! - **Batch Orchestrator**: ordered processing, running totals, progress
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use input_summarizer::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_file("config.toml")?;
//!
//!     let registry = Arc::new(ModelRegistry::from_profiles(&config.models)?);
//!     let tokenizer = Arc::new(TokenizerAdapter::new(registry));
//!     let generator = Arc::new(ChatCompletionClient::new(config.generation.clone())?);
//!     let summarizer = Arc::new(Summarizer::new(generator, tokenizer, SummarizerOptions::default()));
//!     let orchestrator = BatchOrchestrator::new(summarizer);
//!
//!     let records = input_summarizer::dataset::load_records("examples.jsonl")?;
//!     let outcome = orchestrator
//!         .run_batch(&records, "gpt-3.5-turbo", &ReductionSpec::RemovePercent(50.0), Some(10), &LogProgress)
//!         .await?;
//!
//!     println!("Total estimated cost: ${:.4}", outcome.metrics.total_cost);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod budget;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generation;
pub mod models;
pub mod observability;
pub mod pricing;
pub mod summarizer;
pub mod tokenizer;

pub use config::Config;
pub use error::{Result, SummarizerError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::{
        BatchMetrics, BatchOrchestrator, BatchOutcome, ExampleRecord, LogProgress, NoProgress,
        ProgressObserver, RecordStatus, SummarizationResult,
    };
    pub use crate::budget::{plan_budget, reduction_pct, ReductionSpec};
    pub use crate::config::Config;
    pub use crate::error::{
        CostLookupWarning, GenerationError, Result, SummarizationFailure, SummarizerError,
    };
    pub use crate::generation::{ChatCompletionClient, TextGenerator};
    pub use crate::models::{ModelProfile, ModelRegistry};
    pub use crate::pricing::{estimate_cost, CostEstimate, CostModel};
    pub use crate::summarizer::{Summarizer, SummarizerOptions};
    pub use crate::tokenizer::{TokenizerAdapter, TokenizerKind};
}
