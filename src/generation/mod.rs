//! Text generation service: chat completion requests and the client seam

pub mod client;
pub mod models;

pub use client::ChatCompletionClient;
pub use models::{ChatMessage, ChatCompletionRequest, ChatCompletionResponse, Role, TokenUsage};

use async_trait::async_trait;
use crate::error::Result;

/// A request for one generated completion
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Hard cap on output tokens, where the service supports one
    pub max_output_tokens: Option<usize>,
    pub temperature: f32,
}

/// Generated text plus whatever usage the service reported
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Trait for text generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a completion for `request`
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation>;
}
