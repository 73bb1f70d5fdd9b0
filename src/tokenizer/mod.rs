//! Tokenizer adapter: model-aware token counting
//!
//! Each model profile names the tokenizer family its service uses. BPE
//! encodings are loaded once and shared; heuristic estimators are kept for
//! model families without a published encoding.

use crate::error::{Result, SummarizerError};
use crate::models::ModelRegistry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Tokenizer family used by a model profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenizerKind {
    /// GPT-3.5 / GPT-4 family
    Cl100kBase,
    /// GPT-4o family
    O200kBase,
    /// Legacy completion models
    P50kBase,
    CharacterBased { chars_per_token: f32 },
    WordBased { words_per_token: f32 },
}

impl TokenizerKind {
    /// Heuristic rates must be finite and positive
    pub fn validate(&self) -> Result<()> {
        let (name, rate) = match *self {
            TokenizerKind::CharacterBased { chars_per_token } => ("chars_per_token", chars_per_token),
            TokenizerKind::WordBased { words_per_token } => ("words_per_token", words_per_token),
            _ => return Ok(()),
        };

        if rate.is_finite() && rate > 0.0 {
            Ok(())
        } else {
            Err(SummarizerError::Configuration(format!(
                "{} must be a finite number greater than 0, got {}",
                name, rate
            )))
        }
    }

    fn encoding(&self) -> Option<BpeEncoding> {
        match self {
            TokenizerKind::Cl100kBase => Some(BpeEncoding::Cl100k),
            TokenizerKind::O200kBase => Some(BpeEncoding::O200k),
            TokenizerKind::P50kBase => Some(BpeEncoding::P50k),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BpeEncoding {
    Cl100k,
    O200k,
    P50k,
}

impl BpeEncoding {
    fn load(self) -> Result<CoreBPE> {
        let loaded = match self {
            BpeEncoding::Cl100k => tiktoken_rs::cl100k_base(),
            BpeEncoding::O200k => tiktoken_rs::o200k_base(),
            BpeEncoding::P50k => tiktoken_rs::p50k_base(),
        };

        loaded.map_err(|e| {
            SummarizerError::Configuration(format!("Failed to load {:?} encoding: {}", self, e))
        })
    }
}

/// Counts tokens with the tokenizer of a named model profile
pub struct TokenizerAdapter {
    registry: Arc<ModelRegistry>,
    encoders: DashMap<BpeEncoding, Arc<CoreBPE>>,
}

impl TokenizerAdapter {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            encoders: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Count tokens in `text` as the service behind `model_id` would.
    ///
    /// Unknown models are a configuration error: there is no fallback
    /// tokenizer.
    pub fn count_tokens(&self, text: &str, model_id: &str) -> Result<usize> {
        let profile = self.registry.resolve(model_id)?;
        self.count_with(text, &profile.tokenizer)
    }

    /// Count tokens with an explicit tokenizer family
    pub fn count_with(&self, text: &str, kind: &TokenizerKind) -> Result<usize> {
        kind.validate()?;
        if text.is_empty() {
            return Ok(0);
        }

        match kind {
            TokenizerKind::CharacterBased { chars_per_token } => {
                let char_count = text.chars().count();
                Ok((char_count as f32 / chars_per_token).ceil() as usize)
            }
            TokenizerKind::WordBased { words_per_token } => {
                let word_count = text.split_whitespace().count();
                Ok((word_count as f32 / words_per_token).ceil() as usize)
            }
            bpe => {
                // encoding() is Some for every remaining variant
                let encoding = bpe.encoding().ok_or_else(|| {
                    SummarizerError::Configuration(format!("No encoding for {:?}", bpe))
                })?;
                let encoder = self.encoder(encoding)?;
                Ok(encoder.encode_with_special_tokens(text).len())
            }
        }
    }

    /// Make sure the tokenizer for `model_id` is usable before a run starts
    pub fn warm_up(&self, model_id: &str) -> Result<()> {
        let profile = self.registry.resolve(model_id)?;
        if let Some(encoding) = profile.tokenizer.encoding() {
            self.encoder(encoding)?;
        }
        Ok(())
    }

    fn encoder(&self, encoding: BpeEncoding) -> Result<Arc<CoreBPE>> {
        if let Some(existing) = self.encoders.get(&encoding) {
            return Ok(existing.clone());
        }

        debug!("Loading {:?} encoding", encoding);
        let loaded = Arc::new(encoding.load()?);
        Ok(self
            .encoders
            .entry(encoding)
            .or_insert(loaded)
            .value()
            .clone())
    }
}
