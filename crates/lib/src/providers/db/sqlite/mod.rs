use crate::{
    constants::DEFAULT_SAMPLE_ROWS_IN_TABLE_INFO,
    errors::PromptError,
    providers::db::storage::Storage,
    types::{FetchMode, Row, SqlResult},
};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{Connection, Database, Value as TursoValue};

pub mod sql;

/// Sample values longer than this are cut in table descriptions.
const SAMPLE_VALUE_MAX_CHARS: usize = 100;

/// A provider for interacting with a local SQLite database using Turso.
///
/// This provider holds a `Database` instance. When cloned, it shares the same
/// underlying database, so clones see the same file or in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
    sample_rows_in_table_info: usize,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` for the database at `db_path`.
    /// Use `":memory:"` for an isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, PromptError> {
        info!("Connecting to SQLite database at '{db_path}'.");
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        Ok(Self {
            db,
            sample_rows_in_table_info: DEFAULT_SAMPLE_ROWS_IN_TABLE_INFO,
        })
    }

    /// Sets how many sample rows are appended to each table description. `0` disables them.
    pub fn with_sample_rows_in_table_info(mut self, rows: usize) -> Self {
        self.sample_rows_in_table_info = rows;
        self
    }

    /// Executes multiple `;`-separated statements, e.g. to seed a database.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), PromptError> {
        let conn = self.connect()?;

        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ())
                .await
                .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Lists user tables and their `CREATE` statements, ordered by name.
    pub async fn list_tables(&self) -> Result<Vec<(String, String)>, PromptError> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(sql::LIST_TABLES_SQL, ())
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let mut tables = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?
        {
            if let (Ok(TursoValue::Text(name)), Ok(TursoValue::Text(ddl))) =
                (row.get_value(0), row.get_value(1))
            {
                tables.push((name, ddl));
            }
        }
        Ok(tables)
    }

    fn connect(&self) -> Result<Connection, PromptError> {
        self.db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))
    }

    /// Runs `query` and collects up to `limit` rows, keeping column order.
    async fn fetch_rows(
        conn: &Connection,
        query: &str,
        limit: Option<usize>,
    ) -> Result<(Vec<String>, Vec<Row>), PromptError> {
        let mut stmt = conn
            .prepare(query)
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut rows = stmt
            .query(())
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let mut results: Vec<Row> = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?
        {
            let mut row_map = Row::new();
            for (i, name) in column_names.iter().enumerate() {
                let value = row
                    .get_value(i)
                    .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
                row_map.insert(name.clone(), turso_value_to_json(value));
            }
            results.push(row_map);
            if limit.is_some_and(|l| results.len() >= l) {
                break;
            }
        }

        Ok((column_names, results))
    }

    async fn describe_table(
        &self,
        conn: &Connection,
        name: &str,
        ddl: &str,
    ) -> Result<String, PromptError> {
        let mut info = ddl.trim().to_string();
        if self.sample_rows_in_table_info == 0 {
            return Ok(info);
        }

        let (columns, rows) = Self::fetch_rows(
            conn,
            &sql::sample_rows(name, self.sample_rows_in_table_info),
            Some(self.sample_rows_in_table_info),
        )
        .await?;

        info.push_str(&format!(
            "\n\n/*\n{} rows from {name} table:\n{}",
            self.sample_rows_in_table_info,
            columns.join("\t")
        ));
        for row in &rows {
            let line = row
                .values()
                .map(|v| {
                    let text = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    text.chars().take(SAMPLE_VALUE_MAX_CHARS).collect::<String>()
                })
                .collect::<Vec<_>>()
                .join("\t");
            info.push('\n');
            info.push_str(&line);
        }
        info.push_str("\n*/");
        Ok(info)
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider")
            .field("sample_rows_in_table_info", &self.sample_rows_in_table_info)
            .finish_non_exhaustive()
    }
}

impl AsRef<Database> for SqliteProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}

/// Converts a Turso value to a serde_json::Value.
fn turso_value_to_json(v: TursoValue) -> Value {
    match v {
        TursoValue::Null => Value::Null,
        TursoValue::Integer(i) => Value::Number(i.into()),
        TursoValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TursoValue::Text(s) => Value::String(s),
        TursoValue::Blob(_) => Value::String("<blob>".to_string()),
    }
}

#[async_trait]
impl Storage for SqliteProvider {
    fn name(&self) -> &str {
        "SQLite"
    }

    fn dialect(&self) -> &str {
        "sqlite"
    }

    /// Describes tables as their `CREATE` statement followed by a block of sample rows.
    async fn get_table_info(&self, table_names: Option<&[String]>) -> Result<String, PromptError> {
        let all_tables = self.list_tables().await?;

        if let Some(requested) = table_names {
            let missing: Vec<&str> = requested
                .iter()
                .filter(|name| !all_tables.iter().any(|(t, _)| t == *name))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                return Err(PromptError::StorageOperationFailed(format!(
                    "table(s) not found in database: {}",
                    missing.join(", ")
                )));
            }
        }

        let conn = self.connect()?;
        let mut descriptions = Vec::new();
        for (name, ddl) in &all_tables {
            if table_names.is_some_and(|requested| !requested.contains(name)) {
                continue;
            }
            descriptions.push(self.describe_table(&conn, name, ddl).await?);
        }
        debug!(tables = descriptions.len(), "Built table info.");

        Ok(descriptions.join("\n\n"))
    }

    async fn execute(&self, sql: &str, fetch: FetchMode) -> Result<SqlResult, PromptError> {
        debug!(sql = %sql, ?fetch, "--> Executing SQLite statement");
        let conn = self.connect()?;

        let limit = match fetch {
            FetchMode::All => None,
            FetchMode::One => Some(1),
        };
        let (_, mut rows) = Self::fetch_rows(&conn, sql, limit).await?;

        Ok(match fetch {
            FetchMode::All => SqlResult::Rows(rows),
            FetchMode::One => match rows.pop() {
                Some(row) => SqlResult::Row(row),
                None => SqlResult::Rows(Vec::new()),
            },
        })
    }
}
