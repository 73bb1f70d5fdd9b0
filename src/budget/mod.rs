//! Budget planning: reduction specifications and target token budgets

use crate::error::{Result, SummarizerError};
use serde::{Deserialize, Serialize};

/// Tolerance applied before flooring so that products such as
/// `100 * (1.0 - 0.3)` land on 70 rather than 69.
const FLOOR_EPSILON: f64 = 1e-9;

/// How much of the original text should survive summarization.
///
/// Both forms are accepted at the boundary and normalized to a keep ratio.
/// The percentage form is always "percent removed".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionSpec {
    /// Percentage of tokens to remove, in [0, 100]
    RemovePercent(f64),
    /// Fraction of tokens to keep, in [0, 1]
    KeepRatio(f64),
}

impl ReductionSpec {
    /// Build from a percentage to remove, rejecting values outside [0, 100]
    pub fn remove_percent(percent: f64) -> Result<Self> {
        let spec = ReductionSpec::RemovePercent(percent);
        spec.validate()?;
        Ok(spec)
    }

    /// Build from a ratio to keep, rejecting values outside [0, 1]
    pub fn keep_ratio(ratio: f64) -> Result<Self> {
        let spec = ReductionSpec::KeepRatio(ratio);
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            ReductionSpec::RemovePercent(p) if !(0.0..=100.0).contains(&p) => {
                Err(SummarizerError::Configuration(format!(
                    "Reduction percentage must be between 0 and 100, got {}",
                    p
                )))
            }
            ReductionSpec::KeepRatio(r) if !(0.0..=1.0).contains(&r) => {
                Err(SummarizerError::Configuration(format!(
                    "Keep ratio must be between 0.0 and 1.0, got {}",
                    r
                )))
            }
            _ => Ok(()),
        }
    }

    /// Fraction of tokens to keep
    pub fn as_keep_ratio(&self) -> f64 {
        match *self {
            ReductionSpec::RemovePercent(p) => 1.0 - p / 100.0,
            ReductionSpec::KeepRatio(r) => r,
        }
    }

    /// Percentage of tokens to remove
    pub fn as_remove_percent(&self) -> f64 {
        match *self {
            ReductionSpec::RemovePercent(p) => p,
            ReductionSpec::KeepRatio(r) => (1.0 - r) * 100.0,
        }
    }

    /// Normalized internal representation
    pub fn normalized(&self) -> Self {
        ReductionSpec::KeepRatio(self.as_keep_ratio())
    }
}

impl Default for ReductionSpec {
    fn default() -> Self {
        ReductionSpec::RemovePercent(50.0)
    }
}

/// Target output budget for a text of `original_tokens` tokens.
///
/// Empty inputs get a zero budget and should not be sent to the service.
/// Any non-empty input gets at least one token.
pub fn plan_budget(original_tokens: usize, spec: &ReductionSpec) -> usize {
    if original_tokens == 0 {
        return 0;
    }

    let keep = spec.as_keep_ratio().clamp(0.0, 1.0);
    let target = (original_tokens as f64 * keep + FLOOR_EPSILON).floor() as usize;
    target.clamp(1, original_tokens)
}

/// Achieved reduction, rounded to one decimal place. Zero for empty originals.
pub fn reduction_pct(original_tokens: usize, summary_tokens: usize) -> f64 {
    if original_tokens == 0 {
        return 0.0;
    }

    let pct = 100.0 * (1.0 - summary_tokens as f64 / original_tokens as f64);
    (pct * 10.0).round() / 10.0
}
