//! # Synthetic Dataset Generation
//!
//! Generates one sentence per field-set with a language model.

use crate::{
    errors::PromptError,
    llm_chain::LlmChain,
    prompts::{synthetic::SENTENCE_PROMPT, PromptTemplate},
    providers::ai::AiProvider,
    types::{FieldSet, GeneratedRecord},
};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Creates the chain that turns `{fields}` and `{preferences}` into a sentence.
///
/// Uses `SENTENCE_PROMPT` unless `prompt` is given, in which case it must use
/// `{fields}`.
pub fn create_data_generation_chain(
    ai_provider: Box<dyn AiProvider>,
    prompt: Option<PromptTemplate>,
) -> Result<LlmChain, PromptError> {
    let prompt = match prompt {
        Some(prompt) => prompt,
        None => PromptTemplate::new(SENTENCE_PROMPT)?,
    };
    prompt.require_variables(&["fields"])?;
    Ok(LlmChain::new(ai_provider, prompt))
}

/// Generates a synthetic dataset with a given language model.
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    generator: LlmChain,
    sentence_preferences: Map<String, Value>,
}

impl DatasetGenerator {
    /// Creates a generator using the default sentence prompt.
    pub fn new(
        ai_provider: Box<dyn AiProvider>,
        sentence_preferences: Option<Map<String, Value>>,
    ) -> Result<Self, PromptError> {
        Ok(Self::with_chain(
            create_data_generation_chain(ai_provider, None)?,
            sentence_preferences,
        ))
    }

    /// Creates a generator around an existing chain.
    pub fn with_chain(
        generator: LlmChain,
        sentence_preferences: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            generator,
            sentence_preferences: sentence_preferences.unwrap_or_default(),
        }
    }

    /// Runs the chain once per field-set, in order.
    ///
    /// Each record holds `fields`, `preferences` and the generated text under the
    /// chain's output key. The first failure aborts the run.
    pub async fn generate(
        &self,
        fields_collection: &[FieldSet],
    ) -> Result<Vec<GeneratedRecord>, PromptError> {
        info!(count = fields_collection.len(), "Generating synthetic records.");
        let mut results = Vec::with_capacity(fields_collection.len());
        for (i, fields) in fields_collection.iter().enumerate() {
            let mut inputs = Map::new();
            inputs.insert("fields".to_string(), Value::Array(fields.clone()));
            inputs.insert(
                "preferences".to_string(),
                Value::Object(self.sentence_preferences.clone()),
            );
            let record = self.generator.call(inputs).await?;
            debug!(index = i, "Generated synthetic record.");
            results.push(record);
        }
        Ok(results)
    }
}
