//! # Command Handlers
//!
//! Wires providers from `AppConfig` and runs the chains. Results are written to
//! stdout as JSON.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{error, info};
use vectorsql::{
    providers::{
        db::sqlite::{self, SqliteProvider},
        factory::{create_ai_provider, create_embedding_provider},
    },
    types::FieldSet,
    ChainInput, DatasetGenerator, ExecutionMode, SqlOutputParser, VectorSqlDatabaseChain,
    VectorSqlOutputParser, VectorSqlRetrieveAllOutputParser,
};

/// Per-invocation switches on top of the configured chain defaults.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub tables: Option<Vec<String>>,
    pub mode: ExecutionMode,
    pub check: bool,
    pub steps: bool,
    pub verbose: bool,
}

pub async fn handle_query(config: &AppConfig, question: &str, options: QueryOptions) -> Result<()> {
    let chain = build_chain(config, &options).await?;
    info!(?chain, "Chain ready.");

    let input = ChainInput {
        query: question.to_string(),
        table_names_to_use: options.tables,
    };
    match chain.call(input).await {
        Ok(result) => print_json(&result),
        Err(e) => {
            if let Some(steps) = e.intermediate_steps() {
                error!(
                    steps = %serde_json::to_string(steps).unwrap_or_default(),
                    "Chain failed after {} step(s).",
                    steps.len()
                );
            }
            Err(e).context("Vector SQL chain failed")
        }
    }
}

pub async fn handle_generate(
    config: &AppConfig,
    input: &Path,
    preferences: Option<&Path>,
) -> Result<()> {
    let fields: Vec<FieldSet> = read_json(input)?;
    let preferences: Option<Map<String, Value>> = preferences.map(read_json).transpose()?;

    let ai_provider = create_ai_provider(&config.ai)?;
    let generator = DatasetGenerator::new(ai_provider, preferences)?;
    let records = generator.generate(&fields).await?;
    info!(records = records.len(), "Synthetic dataset generated.");

    print_json(&records)
}

async fn build_chain(config: &AppConfig, options: &QueryOptions) -> Result<VectorSqlDatabaseChain> {
    let chain_config = &config.chain;

    let embeddings = create_embedding_provider(config.embedding_config()?)?;
    let vector_literal = chain_config
        .vector_literal
        .as_deref()
        .unwrap_or(sqlite::sql::VECTOR_LITERAL);
    let vector_parser =
        VectorSqlOutputParser::from_embeddings(embeddings, chain_config.distance_func_name.clone())
            .with_vector_literal(vector_literal);
    let parser: Box<dyn SqlOutputParser> = if chain_config.retrieve_all {
        Box::new(VectorSqlRetrieveAllOutputParser::new(vector_parser))
    } else {
        Box::new(vector_parser)
    };

    let storage = SqliteProvider::new(&config.db_url)
        .await
        .with_context(|| format!("Failed to open database '{}'", config.db_url))?
        .with_sample_rows_in_table_info(chain_config.sample_rows_in_table_info);

    // The checker never runs when only the SQL is returned.
    let use_query_checker = options.mode != ExecutionMode::ReturnSql
        && (options.check || chain_config.use_query_checker);

    let chain = VectorSqlDatabaseChain::builder()
        .ai_provider(create_ai_provider(&config.ai)?)
        .storage_provider(Box::new(storage))
        .sql_cmd_parser(parser)
        .top_k(chain_config.top_k)
        .mode(options.mode)
        .use_query_checker(use_query_checker)
        .return_intermediate_steps(options.steps || chain_config.return_intermediate_steps)
        .verbose(options.verbose)
        .build()?;
    Ok(chain)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in '{}'", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
