//! Data models for batch runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One example loaded from the input collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleRecord {
    /// Text to summarize; records without it are not processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Reference output, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

impl ExampleRecord {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            output: None,
        }
    }
}

/// What happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Summarized,
    /// Empty input, no service call made
    Skipped,
    Failed,
}

/// Per-record result, serialized as a flat record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizationResult {
    pub input: String,

    /// Summary text, or an `[ERROR: ...]` marker for failed records
    pub output: String,

    pub original_tokens: usize,
    pub target_tokens: usize,
    pub summary_tokens: usize,
    pub prompt_tokens: usize,
    pub reduction_pct: f64,

    /// USD, rounded to 4 decimals
    pub estimated_cost: f64,

    pub status: RecordStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_output: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummarizationResult {
    pub fn is_failure(&self) -> bool {
        self.status == RecordStatus::Failed
    }

    /// Human-readable progress line for the record at 1-based `index`
    pub fn log_line(&self, index: usize) -> String {
        format!(
            "[#{}] Original: {} → Target: {} → Prompt: {} / Completion: {} → ↓ {:.1}%",
            index,
            self.original_tokens,
            self.target_tokens,
            self.prompt_tokens,
            self.summary_tokens,
            self.reduction_pct
        )
    }
}

/// Totals accumulated over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub total_prompt_tokens: usize,
    pub total_completion_tokens: usize,

    /// Sum of unrounded per-record costs
    pub total_cost: f64,

    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchMetrics {
    /// Fold one record into the totals
    pub fn record(&mut self, result: &SummarizationResult, cost: f64) {
        self.total_prompt_tokens += result.prompt_tokens;
        self.total_completion_tokens += result.summary_tokens;
        self.total_cost += cost;
        self.processed += 1;

        match result.status {
            RecordStatus::Summarized => self.succeeded += 1,
            RecordStatus::Skipped => self.skipped += 1,
            RecordStatus::Failed => self.failed += 1,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            (self.succeeded + self.skipped) as f64 / self.processed as f64
        }
    }
}

/// Everything a batch run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub run_id: Uuid,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Results in input order
    pub results: Vec<SummarizationResult>,

    pub metrics: BatchMetrics,

    /// One log line per processed record
    pub log: Vec<String>,
}
