#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Mock providers shared by the integration tests, so chains can be exercised
//! without a network or a model.

use async_trait::async_trait;
use dotenvy::dotenv;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Once, RwLock};
use vectorsql::{
    callbacks::{ChainCallback, TextColor},
    providers::{
        ai::{AiProvider, EmbeddingProvider},
        db::storage::Storage,
    },
    FetchMode, PromptError, SqlResult,
};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// --- Mock AI Provider ---

/// Replays scripted responses in order and records every call.
/// Once the script is exhausted it answers with an error.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    /// `(system_prompt, user_prompt, stop)` per call.
    pub call_history: Arc<RwLock<Vec<(String, String, Vec<String>)>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(
                responses.into_iter().rev().map(String::from).collect(),
            )),
        }
    }

    pub fn calls(&self) -> Vec<(String, String, Vec<String>)> {
        self.call_history.read().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        self.generate_with_stop(system_prompt, user_prompt, &[]).await
    }

    async fn generate_with_stop(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        stop: &[String],
    ) -> Result<String, PromptError> {
        self.call_history.write().unwrap().push((
            system_prompt.to_string(),
            user_prompt.to_string(),
            stop.to_vec(),
        ));

        self.responses
            .write()
            .unwrap()
            .pop()
            .ok_or_else(|| PromptError::AiApi("MockAiProvider: no response left".to_string()))
    }
}

// --- Mock Embedding Provider ---

/// Returns a fixed vector per entity, or `default` for unknown entities.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    pub vectors: HashMap<String, Vec<f32>>,
    pub default: Vec<f32>,
    pub queries: Arc<RwLock<Vec<String>>>,
    pub fail: bool,
}

impl MockEmbeddingProvider {
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            vectors: HashMap::new(),
            default,
            queries: Arc::new(RwLock::new(Vec::new())),
            fail: false,
        }
    }

    pub fn with_vector(mut self, entity: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(entity.to_string(), vector);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.read().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, PromptError> {
        self.queries.write().unwrap().push(text.to_string());
        if self.fail {
            return Err(PromptError::AiApi("embedding service unavailable".to_string()));
        }
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

// --- Mock Storage Provider ---

/// Records executed SQL and returns a fixed result, or fails every execution.
#[derive(Clone, Debug)]
pub struct MockStorageProvider {
    pub table_info: String,
    pub result: SqlResult,
    pub fail_with: Option<String>,
    pub executed: Arc<RwLock<Vec<(String, FetchMode)>>>,
    pub table_info_requests: Arc<RwLock<Vec<Option<Vec<String>>>>>,
}

impl MockStorageProvider {
    pub fn new(result: SqlResult) -> Self {
        Self {
            table_info: "CREATE TABLE films (title TEXT, year INTEGER, embedding BLOB)".to_string(),
            result,
            fail_with: None,
            executed: Arc::new(RwLock::new(Vec::new())),
            table_info_requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(SqlResult::Rows(Vec::new()))
        }
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed
            .read()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

#[async_trait]
impl Storage for MockStorageProvider {
    fn name(&self) -> &str {
        "MockDB"
    }

    fn dialect(&self) -> &str {
        "mockql"
    }

    async fn get_table_info(&self, table_names: Option<&[String]>) -> Result<String, PromptError> {
        self.table_info_requests
            .write()
            .unwrap()
            .push(table_names.map(|t| t.to_vec()));
        Ok(self.table_info.clone())
    }

    async fn execute(&self, sql: &str, fetch: FetchMode) -> Result<SqlResult, PromptError> {
        self.executed
            .write()
            .unwrap()
            .push((sql.to_string(), fetch));
        match &self.fail_with {
            Some(message) => Err(PromptError::StorageOperationFailed(message.clone())),
            None => Ok(self.result.clone()),
        }
    }
}

// --- Recording Callback ---

#[derive(Clone, Debug, Default)]
pub struct RecordingCallback {
    pub events: Arc<RwLock<Vec<(String, Option<TextColor>, bool)>>>,
}

impl ChainCallback for RecordingCallback {
    fn on_text(&self, text: &str, color: Option<TextColor>, verbose: bool) {
        self.events
            .write()
            .unwrap()
            .push((text.to_string(), color, verbose));
    }
}

/// Builds a row from `(column, value)` pairs, keeping their order.
pub fn row(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
