//! Error types for the summarization pipeline

use thiserror::Error;

/// Result type alias for summarizer operations
pub type Result<T> = std::result::Result<T, SummarizerError>;

/// Main error type for the summarization pipeline
///
/// Only `Configuration` and `InputFormat` are meant to abort a batch run.
/// Generation failures are absorbed per record by the invoker.
#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Input format error: {0}")]
    InputFormat(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the text generation service
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Service returned an empty completion")]
    EmptyCompletion,
}

/// A single record could not be summarized; the batch carries on
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Summarization failed: {reason}")]
pub struct SummarizationFailure {
    pub reason: String,
}

impl SummarizationFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<SummarizerError> for SummarizationFailure {
    fn from(err: SummarizerError) -> Self {
        match err {
            SummarizerError::Generation(inner) => Self::new(inner.to_string()),
            other => Self::new(other.to_string()),
        }
    }
}

/// No pricing is known for a model; the cost for that computation is 0
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No pricing known for model '{model}', estimated cost defaults to 0")]
pub struct CostLookupWarning {
    pub model: String,
}

impl From<config::ConfigError> for SummarizerError {
    fn from(err: config::ConfigError) -> Self {
        SummarizerError::Configuration(err.to_string())
    }
}
