use crate::types::IntermediateStep;
use thiserror::Error;

/// Custom error types for the library.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Missing AI provider: {0}")]
    MissingAiProvider(String),
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("Malformed vector marker: {0}")]
    MalformedVectorMarker(String),
    #[error("Invalid embedding: {0}")]
    InvalidEmbedding(String),
    #[error("Missing value for prompt variable '{0}'")]
    MissingPromptVariable(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    /// A failure inside a chain run, annotated with every step recorded before it.
    #[error("{source}")]
    Chain {
        #[source]
        source: Box<PromptError>,
        intermediate_steps: Vec<IntermediateStep>,
    },
}

impl PromptError {
    /// Wraps `self` with the steps recorded so far. An already wrapped error is
    /// returned as is so the log is never nested.
    pub fn with_intermediate_steps(self, intermediate_steps: Vec<IntermediateStep>) -> Self {
        match self {
            PromptError::Chain { .. } => self,
            other => PromptError::Chain {
                source: Box::new(other),
                intermediate_steps,
            },
        }
    }

    /// The steps recorded before a chain failed, if this error came from a chain.
    pub fn intermediate_steps(&self) -> Option<&[IntermediateStep]> {
        match self {
            PromptError::Chain {
                intermediate_steps, ..
            } => Some(intermediate_steps),
            _ => None,
        }
    }

    /// The underlying error with any chain annotation stripped.
    pub fn root_cause(&self) -> &PromptError {
        match self {
            PromptError::Chain { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
