//! Configuration validation

use super::*;
use crate::error::{Result, SummarizerError};
use crate::models::ModelRegistry;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_generation_config(&config.generation)?;
    validate_model_profiles(&config.models)?;
    validate_summarizer_config(&config.summarizer, &ModelRegistry::from_profiles(&config.models)?)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validate generation service configuration
fn validate_generation_config(config: &GenerationConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(SummarizerError::Configuration(
            "Generation API URL cannot be empty".to_string()
        ));
    }

    if !config.api_url.starts_with("http://") && !config.api_url.starts_with("https://") {
        return Err(SummarizerError::Configuration(
            "Generation API URL must start with http:// or https://".to_string()
        ));
    }

    if config.api_key.expose_secret().is_empty() {
        return Err(SummarizerError::Configuration(
            "Generation API key is required".to_string()
        ));
    }

    if config.timeout_secs == 0 {
        return Err(SummarizerError::Configuration(
            "Generation timeout must be greater than 0".to_string()
        ));
    }

    if config.timeout_secs > 600 {
        return Err(SummarizerError::Configuration(
            "Generation timeout too large (max: 600 seconds)".to_string()
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(SummarizerError::Configuration(
            "Temperature must be between 0.0 and 2.0".to_string()
        ));
    }

    if config.max_tokens_margin > 4096 {
        return Err(SummarizerError::Configuration(
            "Max tokens margin too large (max: 4096)".to_string()
        ));
    }

    Ok(())
}

/// Validate user-supplied model profiles
fn validate_model_profiles(profiles: &[ModelProfile]) -> Result<()> {
    profiles.iter().try_for_each(ModelProfile::validate)
}

/// Validate batch settings against the known model profiles
pub fn validate_summarizer_config(config: &SummarizerConfig, registry: &ModelRegistry) -> Result<()> {
    registry.resolve(&config.model)?;
    config.reduction.validate()?;

    if config.limit == Some(0) {
        return Err(SummarizerError::Configuration(
            "Processing limit must be greater than 0 (omit it for no limit)".to_string()
        ));
    }

    if config.max_concurrency == 0 {
        return Err(SummarizerError::Configuration(
            "Max concurrency must be greater than 0".to_string()
        ));
    }

    if config.max_concurrency > 32 {
        return Err(SummarizerError::Configuration(
            "Max concurrency too large (max: 32)".to_string()
        ));
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        return Err(SummarizerError::Configuration(
            "Log level cannot be empty".to_string()
        ));
    }

    Ok(())
}
