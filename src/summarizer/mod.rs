//! Summarization invoker: one text in, one shorter text plus measured usage out

pub mod prompt;

pub use prompt::{build_messages, PromptLanguage};

use crate::error::{Result, SummarizationFailure};
use crate::generation::{ChatMessage, GenerationRequest, TextGenerator};
use crate::models::ModelProfile;
use crate::tokenizer::TokenizerAdapter;
use std::sync::Arc;
use tracing::{debug, warn};

/// A successful summarization with the tokens it actually consumed
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub text: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

impl Summary {
    /// Summary of an input with nothing to summarize
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            prompt_tokens: 0,
            completion_tokens: 0,
        }
    }
}

/// Tunables for the invoker
#[derive(Debug, Clone)]
pub struct SummarizerOptions {
    /// Added to the target budget to form the service's output cap
    pub max_tokens_margin: usize,
    pub temperature: f32,
    pub language: PromptLanguage,
}

impl Default for SummarizerOptions {
    fn default() -> Self {
        Self {
            max_tokens_margin: 50,
            temperature: 0.3,
            language: PromptLanguage::default(),
        }
    }
}

/// Drives the generation service for single texts
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    tokenizer: Arc<TokenizerAdapter>,
    options: SummarizerOptions,
}

impl Summarizer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        tokenizer: Arc<TokenizerAdapter>,
        options: SummarizerOptions,
    ) -> Self {
        Self {
            generator,
            tokenizer,
            options,
        }
    }

    pub fn tokenizer(&self) -> &Arc<TokenizerAdapter> {
        &self.tokenizer
    }

    /// Summarize `text` towards `target_tokens` output tokens.
    ///
    /// Never fails the caller: any service or measurement problem comes back
    /// as a `SummarizationFailure`. A zero target skips the service call.
    pub async fn invoke(
        &self,
        text: &str,
        profile: &ModelProfile,
        target_tokens: usize,
        remove_percent: f64,
    ) -> std::result::Result<Summary, SummarizationFailure> {
        if target_tokens == 0 {
            debug!("Zero token budget, skipping generation");
            return Ok(Summary::empty());
        }

        self.try_invoke(text, profile, target_tokens, remove_percent)
            .await
            .map_err(|e| {
                let failure = SummarizationFailure::from(e);
                warn!("{}", failure);
                failure
            })
    }

    async fn try_invoke(
        &self,
        text: &str,
        profile: &ModelProfile,
        target_tokens: usize,
        remove_percent: f64,
    ) -> Result<Summary> {
        let messages = build_messages(text, target_tokens, remove_percent, self.options.language);
        let cap = target_tokens
            .saturating_add(self.options.max_tokens_margin)
            .min(profile.context_window);

        let request = GenerationRequest {
            model: profile.id.clone(),
            messages,
            max_output_tokens: Some(cap),
            temperature: self.options.temperature,
        };

        let generation = self.generator.generate(&request).await?;

        let (prompt_tokens, completion_tokens) = match generation.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None => {
                debug!("No usage reported, measuring locally");
                (
                    self.count_messages(&request.messages, profile)?,
                    self.tokenizer.count_with(&generation.text, &profile.tokenizer)?,
                )
            }
        };

        Ok(Summary {
            text: generation.text,
            prompt_tokens,
            completion_tokens,
        })
    }

    fn count_messages(&self, messages: &[ChatMessage], profile: &ModelProfile) -> Result<usize> {
        let mut total = 0;
        for message in messages {
            total += self.tokenizer.count_with(&message.content, &profile.tokenizer)?;
        }
        Ok(total)
    }
}
