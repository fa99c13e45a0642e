//! # Application Configuration
//!
//! Loads the CLI configuration from an optional YAML file and environment
//! variables.
//!
//! - `${VAR}` placeholders in the file are replaced with the variable's value
//!   (empty when unset) before parsing.
//! - `VECTORSQL_...` variables override any key, with `__` separating nested
//!   keys (e.g. `VECTORSQL_AI__API_KEY`, `VECTORSQL_CHAIN__TOP_K`).

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use vectorsql::types::{EmbeddingConfig, ProviderConfig};

/// The file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "vectorsql.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    /// An error from the underlying `config` crate or from reading the file.
    #[error("Configuration error: {0}")]
    General(String),
    /// An explicitly requested configuration file does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `vectorsql.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Path of the SQLite database to query.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// The model that writes SQL and answers.
    pub ai: ProviderConfig,
    /// The model that embeds `NeuralArray(...)` entities. Only the query
    /// commands need it.
    #[serde(default)]
    pub embedding: Option<EmbeddingConfig>,
    #[serde(default)]
    pub chain: ChainConfig,
}

impl AppConfig {
    /// The embedding section, or an error naming the missing section.
    pub fn embedding_config(&self) -> Result<&EmbeddingConfig, ConfigError> {
        self.embedding.as_ref().ok_or_else(|| {
            ConfigError::NotFound(
                "The 'embedding' section is required to run vector SQL queries.".to_string(),
            )
        })
    }
}

/// Defaults for every chain the CLI builds. Command-line flags can only turn
/// features on.
#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub use_query_checker: bool,
    #[serde(default = "default_distance_func_name")]
    pub distance_func_name: String,
    /// Rewrite the select list of generated SQL to `*`.
    #[serde(default)]
    pub retrieve_all: bool,
    #[serde(default)]
    pub return_intermediate_steps: bool,
    #[serde(default = "default_sample_rows_in_table_info")]
    pub sample_rows_in_table_info: usize,
    /// Template for vector literals in executed SQL, `{}` standing for the
    /// bracketed list. Defaults to the SQLite `vector32('{}')` form.
    #[serde(default)]
    pub vector_literal: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            use_query_checker: false,
            distance_func_name: default_distance_func_name(),
            retrieve_all: false,
            return_intermediate_steps: false,
            sample_rows_in_table_info: default_sample_rows_in_table_info(),
            vector_literal: None,
        }
    }
}

fn default_db_url() -> String {
    "db/vectorsql.db".to_string()
}

fn default_top_k() -> usize {
    vectorsql::constants::DEFAULT_TOP_K
}

fn default_distance_func_name() -> String {
    vectorsql::constants::DEFAULT_DISTANCE_FUNC_NAME.to_string()
}

fn default_sample_rows_in_table_info() -> usize {
    vectorsql::constants::DEFAULT_SAMPLE_ROWS_IN_TABLE_INFO
}

/// Reads a file and substitutes `${VAR}` placeholders.
/// Returns `Ok(None)` if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded_content.into_owned()))
}

/// Loads the configuration.
///
/// An explicit `config_path` must exist. Without one, `vectorsql.yml` in the
/// working directory is used when present, otherwise only the environment.
pub fn get_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let content = match config_path {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            ConfigError::NotFound(format!("Config file not found at '{path}'."))
        })?),
        None => read_and_substitute(DEFAULT_CONFIG_FILE)?,
    };
    if let Some(content) = content {
        info!(
            "Loading configuration from '{}'.",
            config_path.unwrap_or(DEFAULT_CONFIG_FILE)
        );
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("VECTORSQL")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
