//! Configuration management for the summarizer

use crate::budget::ReductionSpec;
use crate::dataset::OutputFormat;
use crate::models::ModelProfile;
use crate::summarizer::PromptLanguage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use secrecy::{Secret, ExposeSecret};

pub mod loader;
pub mod validation;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub generation: GenerationConfig,
    pub summarizer: SummarizerConfig,

    /// Extra or overriding model profiles
    #[serde(default)]
    pub models: Vec<ModelProfile>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the chat completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Chat completions endpoint URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (secured)
    #[serde(serialize_with = "serialize_secret", deserialize_with = "deserialize_secret")]
    pub api_key: Secret<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Tokens added on top of the target budget for the output cap
    #[serde(default = "default_max_tokens_margin")]
    pub max_tokens_margin: usize,
}

/// Batch summarization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Model profile identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Target reduction
    #[serde(default)]
    pub reduction: ReductionSpec,

    /// Maximum records per run; omitted means no limit
    #[serde(default)]
    pub limit: Option<usize>,

    /// Generation requests in flight at once (1 = sequential)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Language of the summarization instruction
    #[serde(default)]
    pub prompt_language: PromptLanguage,
}

/// Where and how results are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub dir: String,

    #[serde(default)]
    pub format: OutputFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_timeout() -> u64 { 60 }
fn default_temperature() -> f32 { 0.3 }
fn default_max_tokens_margin() -> usize { 50 }
fn default_model() -> String { "gpt-3.5-turbo".to_string() }
fn default_max_concurrency() -> usize { 1 }
fn default_output_dir() -> String { ".".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        loader::load_config(path)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        loader::load_config_with_env(path)
    }

    /// Validate this configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        validation::validate_config(self)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Self {
            generation: GenerationConfig {
                api_url: default_api_url(),
                api_key: Secret::new(std::env::var("OPENAI_API_KEY").unwrap_or_default()),
                timeout_secs: default_timeout(),
                temperature: default_temperature(),
                max_tokens_margin: default_max_tokens_margin(),
            },
            summarizer: SummarizerConfig {
                model: default_model(),
                reduction: ReductionSpec::default(),
                limit: None,
                max_concurrency: default_max_concurrency(),
                prompt_language: PromptLanguage::default(),
            },
            models: Vec::new(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Custom serializer for Secret<String>
fn serialize_secret<S>(secret: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

/// Custom deserializer for Secret<String>
fn deserialize_secret<'de, D>(deserializer: D) -> Result<Secret<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(Secret::new(s))
}
