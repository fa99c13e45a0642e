use crate::errors::PromptError;
use crate::types::{FetchMode, SqlResult};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a SQL storage backend.
///
/// This trait defines the database utility the vector SQL chain talks to: it
/// describes tables for the prompt and executes the generated statements.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Returns the SQL dialect written into prompts (e.g., "sqlite").
    fn dialect(&self) -> &str;

    /// Describes the given tables, or every table when `table_names` is `None`.
    ///
    /// Fails if any requested table does not exist.
    async fn get_table_info(&self, table_names: Option<&[String]>) -> Result<String, PromptError>;

    /// Executes a SQL statement.
    ///
    /// `FetchMode::All` returns `SqlResult::Rows`. `FetchMode::One` returns
    /// `SqlResult::Row` with the first row, or an empty `SqlResult::Rows` when the
    /// statement produced no rows.
    async fn execute(&self, sql: &str, fetch: FetchMode) -> Result<SqlResult, PromptError>;
}

dyn_clone::clone_trait_object!(Storage);
