//! Model profiles: tokenizer family, pricing and context window per model

use crate::error::{Result, SummarizerError};
use crate::tokenizer::TokenizerKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Static description of one generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Model identifier sent to the service
    pub id: String,

    /// Tokenizer family the service counts with
    pub tokenizer: TokenizerKind,

    /// USD per 1,000 prompt tokens
    pub prompt_rate_per_1k: f64,

    /// USD per 1,000 completion tokens
    pub completion_rate_per_1k: f64,

    /// Maximum context size in tokens
    pub context_window: usize,
}

impl ModelProfile {
    pub fn new(
        id: impl Into<String>,
        tokenizer: TokenizerKind,
        prompt_rate_per_1k: f64,
        completion_rate_per_1k: f64,
        context_window: usize,
    ) -> Self {
        Self {
            id: id.into(),
            tokenizer,
            prompt_rate_per_1k,
            completion_rate_per_1k,
            context_window,
        }
    }

    /// Reject profiles that would break token counting or pricing
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SummarizerError::Configuration(
                "Model profile id cannot be empty".to_string(),
            ));
        }

        let rates_ok = [self.prompt_rate_per_1k, self.completion_rate_per_1k]
            .iter()
            .all(|rate| rate.is_finite() && *rate >= 0.0);
        if !rates_ok {
            return Err(SummarizerError::Configuration(format!(
                "Model '{}' token rates must be finite and non-negative",
                self.id
            )));
        }

        if self.context_window == 0 {
            return Err(SummarizerError::Configuration(format!(
                "Model '{}' context window must be greater than 0",
                self.id
            )));
        }

        self.tokenizer.validate().map_err(|e| match e {
            SummarizerError::Configuration(msg) => {
                SummarizerError::Configuration(format!("Model '{}': {}", self.id, msg))
            }
            other => other,
        })
    }

    pub fn gpt_35_turbo() -> Self {
        Self::new("gpt-3.5-turbo", TokenizerKind::Cl100kBase, 0.0015, 0.002, 16_385)
    }

    pub fn gpt_4() -> Self {
        Self::new("gpt-4", TokenizerKind::Cl100kBase, 0.03, 0.06, 8_192)
    }

    pub fn gpt_4_turbo() -> Self {
        Self::new("gpt-4-turbo", TokenizerKind::Cl100kBase, 0.01, 0.03, 128_000)
    }

    pub fn gpt_4o() -> Self {
        Self::new("gpt-4o", TokenizerKind::O200kBase, 0.005, 0.015, 128_000)
    }

    pub fn gpt_4o_mini() -> Self {
        Self::new("gpt-4o-mini", TokenizerKind::O200kBase, 0.00015, 0.0006, 128_000)
    }
}

/// Process-wide table of model profiles keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    profiles: IndexMap<String, ModelProfile>,
}

impl ModelRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in OpenAI profiles
    pub fn with_builtin_profiles() -> Self {
        let mut registry = Self::new();
        for profile in [
            ModelProfile::gpt_35_turbo(),
            ModelProfile::gpt_4(),
            ModelProfile::gpt_4_turbo(),
            ModelProfile::gpt_4o(),
            ModelProfile::gpt_4o_mini(),
        ] {
            registry.profiles.insert(profile.id.clone(), profile);
        }
        registry
    }

    /// Built-ins followed by `extra`; an extra profile replaces a built-in
    /// with the same identifier
    pub fn from_profiles(extra: &[ModelProfile]) -> Result<Self> {
        let mut registry = Self::with_builtin_profiles();
        for profile in extra {
            registry.register(profile.clone())?;
        }
        Ok(registry)
    }

    /// Add or replace a validated profile; returns the replaced one, if any
    pub fn register(&mut self, profile: ModelProfile) -> Result<Option<ModelProfile>> {
        profile.validate()?;
        Ok(self.profiles.insert(profile.id.clone(), profile))
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelProfile> {
        self.profiles.get(model_id)
    }

    /// Look up a profile, failing on unknown identifiers
    pub fn resolve(&self, model_id: &str) -> Result<&ModelProfile> {
        self.get(model_id).ok_or_else(|| {
            SummarizerError::Configuration(format!(
                "Unknown model '{}' (known: {})",
                model_id,
                self.ids().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
