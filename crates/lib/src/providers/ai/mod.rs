pub mod embedding;
pub mod gemini;
pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{generate_embedding, ApiEmbeddingProvider, EmbeddingProvider};
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for text generation across different
/// Large Language Models (e.g., Gemini, local OpenAI-compatible models).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// An empty system prompt is not sent to the model.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, PromptError>;

    /// Generates a response that ends before the first of the `stop` sequences.
    ///
    /// Providers whose API supports stop sequences override this. The default
    /// truncates the full response locally.
    async fn generate_with_stop(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        stop: &[String],
    ) -> Result<String, PromptError> {
        let response = self.generate(system_prompt, user_prompt).await?;
        Ok(truncate_at_stop(&response, stop).to_string())
    }
}

dyn_clone::clone_trait_object!(AiProvider);

/// Cuts `text` at the earliest occurrence of any stop sequence.
pub fn truncate_at_stop<'a>(text: &'a str, stop: &[String]) -> &'a str {
    stop.iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
        .map_or(text, |end| &text[..end])
}
