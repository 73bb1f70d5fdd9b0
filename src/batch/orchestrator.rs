//! Batch orchestrator: budget, summarize, measure and price each record in order

use super::models::*;
use super::progress::ProgressObserver;
use crate::budget::{plan_budget, reduction_pct, ReductionSpec};
use crate::error::{Result, SummarizerError};
use crate::models::ModelProfile;
use crate::pricing::{estimate_cost, round_cost};
use crate::summarizer::{Summarizer, Summary};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// An eligible record waiting to be processed
struct Pending<'a> {
    input: &'a str,
    reference_output: Option<&'a serde_json::Value>,
}

/// Runs batches of records through the summarization pipeline
pub struct BatchOrchestrator {
    summarizer: Arc<Summarizer>,
    max_concurrency: usize,
}

impl BatchOrchestrator {
    /// Costs are priced from the same profile that counted the tokens
    pub fn new(summarizer: Arc<Summarizer>) -> Self {
        Self {
            summarizer,
            max_concurrency: 1,
        }
    }

    /// Allow up to `max_concurrency` generation calls in flight. Results keep
    /// input order regardless.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Summarize `records` with `model_id`.
    ///
    /// Records without `input` are dropped first. An empty eligible set,
    /// an unknown model or an invalid reduction fails before any service
    /// call; individual record failures are kept as marked results.
    pub async fn run_batch(
        &self,
        records: &[ExampleRecord],
        model_id: &str,
        reduction: &ReductionSpec,
        limit: Option<usize>,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchOutcome> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();

        let eligible: Vec<Pending<'_>> = records
            .iter()
            .filter_map(|record| {
                record.input.as_deref().map(|input| Pending {
                    input,
                    reference_output: record.output.as_ref(),
                })
            })
            .collect();

        if eligible.is_empty() {
            return Err(SummarizerError::InputFormat(format!(
                "None of the {} records has an 'input' field",
                records.len()
            )));
        }

        reduction.validate()?;
        if limit == Some(0) {
            return Err(SummarizerError::Configuration(
                "Processing limit must be greater than 0".to_string(),
            ));
        }

        let tokenizer = self.summarizer.tokenizer();
        let profile = tokenizer.registry().resolve(model_id)?;
        tokenizer.warm_up(model_id)?;

        let total = limit.map_or(eligible.len(), |l| l.min(eligible.len()));
        let dropped = records.len() - eligible.len();
        if dropped > 0 {
            warn!("Skipping {} records without an 'input' field", dropped);
        }
        info!(
            run_id = %run_id,
            model = model_id,
            records = total,
            keep_ratio = reduction.as_keep_ratio(),
            "Starting batch"
        );

        let timer = Instant::now();
        let mut results = Vec::with_capacity(total);
        let mut metrics = BatchMetrics::default();
        let mut log = Vec::with_capacity(total);

        let mut processed = stream::iter(eligible.into_iter().take(total))
            .map(|pending| self.process_record(pending, profile, reduction))
            .buffered(self.max_concurrency);

        while let Some(item) = processed.next().await {
            let mut result = item?;
            let index = results.len() + 1;

            let cost = estimate_cost(result.prompt_tokens, result.summary_tokens, profile);
            result.estimated_cost = round_cost(cost);
            metrics.record(&result, cost);

            let line = result.log_line(index);
            debug!("{}", line);
            log.push(line);

            observer.on_record(index, &result);
            observer.on_progress(index as f64 / total as f64);
            results.push(result);
        }

        info!(
            run_id = %run_id,
            succeeded = metrics.succeeded,
            failed = metrics.failed,
            skipped = metrics.skipped,
            total_cost = metrics.total_cost,
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Batch finished"
        );

        Ok(BatchOutcome {
            run_id,
            model: model_id.to_string(),
            started_at,
            finished_at: Utc::now(),
            results,
            metrics,
            log,
        })
    }

    async fn process_record(
        &self,
        pending: Pending<'_>,
        profile: &ModelProfile,
        reduction: &ReductionSpec,
    ) -> Result<SummarizationResult> {
        let original_tokens = self
            .summarizer
            .tokenizer()
            .count_with(pending.input, &profile.tokenizer)?;
        let target_tokens = plan_budget(original_tokens, reduction);

        let outcome = self
            .summarizer
            .invoke(pending.input, profile, target_tokens, reduction.as_remove_percent())
            .await;

        let result = match outcome {
            Ok(Summary { text, prompt_tokens, completion_tokens }) => {
                let status = if target_tokens == 0 {
                    RecordStatus::Skipped
                } else {
                    RecordStatus::Summarized
                };

                SummarizationResult {
                    input: pending.input.to_string(),
                    output: text,
                    original_tokens,
                    target_tokens,
                    summary_tokens: completion_tokens,
                    prompt_tokens,
                    reduction_pct: reduction_pct(original_tokens, completion_tokens),
                    estimated_cost: 0.0,
                    status,
                    reference_output: pending.reference_output.cloned(),
                    error: None,
                }
            }
            Err(failure) => SummarizationResult {
                input: pending.input.to_string(),
                output: format!("[ERROR: {}]", failure.reason),
                original_tokens,
                target_tokens,
                summary_tokens: 0,
                prompt_tokens: 0,
                reduction_pct: 0.0,
                estimated_cost: 0.0,
                status: RecordStatus::Failed,
                reference_output: pending.reference_output.cloned(),
                error: Some(failure.reason),
            },
        };

        Ok(result)
    }
}
