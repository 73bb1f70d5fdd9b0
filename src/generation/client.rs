//! Chat completion client for OpenAI-compatible endpoints

use super::{models::*, Generation, GenerationRequest, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Client for the chat completion API
///
/// Holds its own key and HTTP client; no process-wide state. Requests are
/// not retried.
pub struct ChatCompletionClient {
    config: GenerationConfig,
    http_client: Client,
}

impl ChatCompletionClient {
    /// Create a new chat completion client
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(GenerationError::NetworkError)?;

        info!("Initialized chat completion client for {}", config.api_url);

        Ok(Self {
            config,
            http_client,
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.config.timeout_secs)
        } else {
            GenerationError::NetworkError(err)
        }
    }

    async fn send(&self, body: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        debug!("Making chat completion request for model {}", body.model);

        let response = self.http_client
            .post(&self.config.api_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();

        match status {
            s if s.is_success() => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| self.map_transport_error(e))?;

                serde_json::from_str::<ChatCompletionResponse>(&text).map_err(|e| {
                    error!("Failed to parse chat completion response: {}", e);
                    GenerationError::MalformedResponse(e.to_string()).into()
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("Authentication failed");
                Err(GenerationError::AuthenticationFailed.into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                Err(GenerationError::RateLimitExceeded.into())
            }
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                error!("API request failed with status {}: {}", status, error_text);
                Err(GenerationError::ApiError(format!(
                    "Status {}: {}",
                    status, error_text
                )).into())
            }
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation> {
        let body = ChatCompletionRequest {
            model: request.model.clone(),
            messages: request.messages.clone(),
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        let response = self.send(&body).await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            GenerationError::MalformedResponse("No choices returned".to_string())
        })?;

        if choice.finish_reason.as_deref() == Some("length") {
            debug!("Completion stopped at the output cap");
        }

        let text = choice
            .message
            .content
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion.into());
        }

        Ok(Generation {
            text,
            usage: response.usage,
        })
    }
}
