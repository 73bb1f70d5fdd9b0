//! Cost model: advisory USD estimates from per-1K token rates

use crate::error::CostLookupWarning;
use crate::models::{ModelProfile, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Cost of a prompt/completion pair under `profile`'s rates
pub fn estimate_cost(prompt_tokens: usize, completion_tokens: usize, profile: &ModelProfile) -> f64 {
    (prompt_tokens as f64 * profile.prompt_rate_per_1k
        + completion_tokens as f64 * profile.completion_rate_per_1k)
        / 1000.0
}

/// Round a cost for display and serialization
pub fn round_cost(cost: f64) -> f64 {
    (cost * 10_000.0).round() / 10_000.0
}

/// Outcome of a cost lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub cost: f64,
    #[serde(skip)]
    pub warning: Option<CostLookupWarning>,
}

impl CostEstimate {
    pub fn format(&self) -> String {
        format!("${:.4}", self.cost)
    }
}

/// Looks rates up by model identifier
#[derive(Clone)]
pub struct CostModel {
    registry: Arc<ModelRegistry>,
}

impl CostModel {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Estimate the cost for `model_id`. Unknown models cost 0 and carry a
    /// warning instead of failing.
    pub fn estimate(&self, prompt_tokens: usize, completion_tokens: usize, model_id: &str) -> CostEstimate {
        match self.registry.get(model_id) {
            Some(profile) => CostEstimate {
                prompt_tokens,
                completion_tokens,
                cost: estimate_cost(prompt_tokens, completion_tokens, profile),
                warning: None,
            },
            None => {
                let warning = CostLookupWarning {
                    model: model_id.to_string(),
                };
                warn!("{}", warning);
                CostEstimate {
                    prompt_tokens,
                    completion_tokens,
                    cost: 0.0,
                    warning: Some(warning),
                }
            }
        }
    }
}
