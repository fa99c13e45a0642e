//! # LLM Chain
//!
//! The smallest building block: render a prompt template, call the AI provider,
//! hand back the text.

use crate::{
    constants::DEFAULT_OUTPUT_KEY,
    errors::PromptError,
    prompts::PromptTemplate,
    providers::ai::AiProvider,
};
use serde_json::{Map, Value};
use tracing::debug;

/// A prompt template bound to an AI provider.
#[derive(Debug, Clone)]
pub struct LlmChain {
    ai_provider: Box<dyn AiProvider>,
    prompt: PromptTemplate,
    system_prompt: String,
    output_key: String,
}

impl LlmChain {
    pub fn new(ai_provider: Box<dyn AiProvider>, prompt: PromptTemplate) -> Self {
        Self {
            ai_provider,
            prompt,
            system_prompt: String::new(),
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
        }
    }

    /// Sets the system prompt sent with every call. Empty by default.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Sets the key `call` stores the generated text under. `text` by default.
    pub fn with_output_key(mut self, output_key: impl Into<String>) -> Self {
        self.output_key = output_key.into();
        self
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Renders the prompt with `variables` and returns the model's text.
    pub async fn predict(
        &self,
        variables: &Map<String, Value>,
        stop: &[String],
    ) -> Result<String, PromptError> {
        let user_prompt = self.prompt.format(variables)?;
        debug!(user_prompt = %user_prompt, "--> Sending prompt to AI provider");
        let response = self
            .ai_provider
            .generate_with_stop(&self.system_prompt, &user_prompt, stop)
            .await?;
        debug!("<-- AI response: {}", response);
        Ok(response)
    }

    /// Like `predict`, but returns the inputs with the generated text added under
    /// the output key.
    pub async fn call(&self, mut inputs: Map<String, Value>) -> Result<Map<String, Value>, PromptError> {
        let text = self.predict(&inputs, &[]).await?;
        inputs.insert(self.output_key.clone(), Value::String(text));
        Ok(inputs)
    }
}
