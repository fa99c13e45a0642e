//! # Provider Factory
//!
//! Builds boxed AI and embedding providers from their configuration so that every
//! consumer (the CLI, tests, embedding applications) wires providers the same way.

use crate::{
    errors::PromptError,
    providers::ai::{
        gemini::GeminiProvider, local::LocalAiProvider, AiProvider, ApiEmbeddingProvider,
        EmbeddingProvider,
    },
    types::{EmbeddingConfig, ProviderConfig},
};
use tracing::info;

/// Creates an AI provider from its configuration.
///
/// - `gemini` requires an API key; the URL is derived from the model name when unset.
/// - `local` requires an API URL; the key is optional.
pub fn create_ai_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    info!(
        "Creating '{}' AI provider for model '{}'",
        config.provider, config.model_name
    );

    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "an api_key is required for the gemini provider".to_string(),
                )
            })?;
            let api_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| GeminiProvider::default_api_url(&config.model_name));
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "an api_url is required for the local provider".to_string(),
                )
            })?;
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone(),
                Some(config.model_name.clone()),
            )?)
        }
        other => {
            return Err(PromptError::MissingAiProvider(format!(
                "unsupported AI provider '{other}', expected 'gemini' or 'local'"
            )))
        }
    };

    Ok(provider)
}

/// Creates the embedding provider used by the vector SQL parsers.
pub fn create_embedding_provider(
    config: &EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>, PromptError> {
    info!("Creating embedding provider for model '{}'", config.model_name);
    Ok(Box::new(ApiEmbeddingProvider::new(
        config.api_url.clone(),
        config.model_name.clone(),
        config.api_key.clone(),
    )?))
}
