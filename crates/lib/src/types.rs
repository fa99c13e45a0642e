use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single database row: column name to value, in the column order of the result set.
pub type Row = Map<String, Value>;

/// An ordered collection of arbitrary values handed to the dataset generator.
pub type FieldSet = Vec<Value>;

/// The chain output for one field-set: the chain inputs plus the generated text.
pub type GeneratedRecord = Map<String, Value>;

/// How many rows the storage provider should fetch for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    #[default]
    All,
    One,
}

/// The rows returned by a storage provider.
///
/// A single-row fetch is represented as one mapping, a multi-row fetch as an
/// ordered sequence of mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlResult {
    Row(Row),
    Rows(Vec<Row>),
}

impl SqlResult {
    pub fn len(&self) -> usize {
        match self {
            SqlResult::Row(_) => 1,
            SqlResult::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies `f` to every value of every row.
    pub fn map_values(self, f: impl Fn(Value) -> Value) -> Self {
        let map_row = |row: Row| row.into_iter().map(|(k, v)| (k, f(v))).collect::<Row>();
        match self {
            SqlResult::Row(row) => SqlResult::Row(map_row(row)),
            SqlResult::Rows(rows) => SqlResult::Rows(rows.into_iter().map(map_row).collect()),
        }
    }
}

impl fmt::Display for SqlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// One recorded artifact of a chain run.
///
/// Steps alternate between the input handed to a stage and the output it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntermediateStep {
    Input(Map<String, Value>),
    Output(String),
}

impl IntermediateStep {
    pub fn is_input(&self) -> bool {
        matches!(self, IntermediateStep::Input(_))
    }

    pub fn as_output(&self) -> Option<&str> {
        match self {
            IntermediateStep::Output(s) => Some(s),
            IntermediateStep::Input(_) => None,
        }
    }

    pub fn as_input(&self) -> Option<&Map<String, Value>> {
        match self {
            IntermediateStep::Input(m) => Some(m),
            IntermediateStep::Output(_) => None,
        }
    }
}

/// What the chain hands back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Stop after parsing and return the executable SQL.
    ReturnSql,
    /// Execute the SQL and return the coerced rows.
    ReturnDirect,
    /// Execute the SQL and ask the model for a natural-language answer.
    #[default]
    Answer,
}

/// The input of a single chain run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainInput {
    /// The natural-language question.
    pub query: String,
    /// Restricts the schema description to these tables. `None` means all tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_names_to_use: Option<Vec<String>>,
}

impl From<&str> for ChainInput {
    fn from(query: &str) -> Self {
        Self {
            query: query.to_string(),
            table_names_to_use: None,
        }
    }
}

/// The final output of a chain run, shaped by the `ExecutionMode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChainOutput {
    Sql(String),
    Rows(SqlResult),
    Answer(String),
}

impl ChainOutput {
    /// The SQL or answer text. `None` for row results.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ChainOutput::Sql(s) | ChainOutput::Answer(s) => Some(s),
            ChainOutput::Rows(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainResult {
    pub result: ChainOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate_steps: Option<Vec<IntermediateStep>>,
}

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// The type of provider (`gemini` or `local`).
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which can be absent for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Configuration for the embedding model used to resolve vector markers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
}
