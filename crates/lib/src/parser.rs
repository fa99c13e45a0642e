//! # Vector SQL Output Parsers
//!
//! Models write vector searches as `DISTANCE(column, NeuralArray(entity))`. The
//! parsers here turn that into SQL the backend can run: the marker becomes a
//! literal vector (`[0.1,0.2]`) computed by the embedding model, and `DISTANCE`
//! becomes the backend's distance function.

use crate::{
    constants::{DEFAULT_DISTANCE_FUNC_NAME, DISTANCE_PLACEHOLDER, NEURAL_ARRAY_MARKER},
    errors::PromptError,
    providers::ai::EmbeddingProvider,
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;
use tracing::debug;

static SELECT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bSELECT\b").unwrap());

static FROM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bFROM\b").unwrap());

/// The placeholder a vector literal template uses for the rendered vector.
pub const VECTOR_LITERAL_PLACEHOLDER: &str = "{}";

/// Turns raw model output into an executable SQL statement.
#[async_trait]
pub trait SqlOutputParser: Send + Sync + Debug + DynClone {
    async fn parse(&self, text: &str) -> Result<String, PromptError>;

    /// A stable name for logs and serialized chain descriptions.
    fn parser_type(&self) -> &str;
}

dyn_clone::clone_trait_object!(SqlOutputParser);

/// Replaces the first `NeuralArray(entity)` marker with the entity's embedding and
/// renames `DISTANCE` to the configured function.
///
/// When the output has no marker, `DISTANCE` is left as written unless
/// `always_rename_distance` is set.
///
/// The vector is written as a bare `[v1,v2]` unless a vector literal template is
/// set, e.g. `vector32('{}')` for turso / libSQL.
#[derive(Debug, Clone)]
pub struct VectorSqlOutputParser {
    model: Box<dyn EmbeddingProvider>,
    distance_func_name: String,
    always_rename_distance: bool,
    vector_literal: Option<String>,
}

impl VectorSqlOutputParser {
    /// Creates a parser that renames `DISTANCE` to `distance`.
    pub fn new(model: Box<dyn EmbeddingProvider>) -> Self {
        Self::from_embeddings(model, DEFAULT_DISTANCE_FUNC_NAME)
    }

    pub fn from_embeddings(
        model: Box<dyn EmbeddingProvider>,
        distance_func_name: impl Into<String>,
    ) -> Self {
        Self {
            model,
            distance_func_name: distance_func_name.into(),
            always_rename_distance: false,
            vector_literal: None,
        }
    }

    /// Also rename `DISTANCE` in output that contains no vector marker.
    pub fn with_always_rename_distance(mut self, always: bool) -> Self {
        self.always_rename_distance = always;
        self
    }

    /// Wraps every rendered vector in `template`, replacing its `{}`.
    pub fn with_vector_literal(mut self, template: impl Into<String>) -> Self {
        self.vector_literal = Some(template.into());
        self
    }

    pub fn distance_func_name(&self) -> &str {
        &self.distance_func_name
    }

    fn render_vector(&self, values: &[f32]) -> Result<String, PromptError> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(PromptError::InvalidEmbedding(format!(
                "embedding contains the non-finite value {bad}"
            )));
        }
        let vector = format_vector(values);
        Ok(match &self.vector_literal {
            Some(template) => template.replace(VECTOR_LITERAL_PLACEHOLDER, &vector),
            None => vector,
        })
    }

    async fn substitute(&self, text: &str) -> Result<String, PromptError> {
        let text = text.trim();

        // A marker at the very start cannot belong to a statement and is left alone.
        let mut sql = match text.find(NEURAL_ARRAY_MARKER) {
            Some(start) if start > 0 => {
                let entity_start = start + NEURAL_ARRAY_MARKER.len();
                let entity_len = text[entity_start..].find(')').ok_or_else(|| {
                    PromptError::MalformedVectorMarker(format!(
                        "`{NEURAL_ARRAY_MARKER}` at byte {start} has no closing parenthesis"
                    ))
                })?;
                let entity = &text[entity_start..entity_start + entity_len];
                if entity.trim().is_empty() {
                    return Err(PromptError::MalformedVectorMarker(format!(
                        "`{NEURAL_ARRAY_MARKER}` at byte {start} has no entity text"
                    )));
                }
                let marker = &text[start..=entity_start + entity_len];

                debug!(entity = %entity, "Embedding vector marker entity");
                let vector = self.model.embed_query(entity).await?;
                let literal = self.render_vector(&vector)?;

                text.replace(marker, &literal)
                    .replace(DISTANCE_PLACEHOLDER, &self.distance_func_name)
            }
            _ if self.always_rename_distance => {
                text.replace(DISTANCE_PLACEHOLDER, &self.distance_func_name)
            }
            _ => text.to_string(),
        };

        if sql.ends_with(';') {
            sql.pop();
        }
        Ok(sql)
    }
}

#[async_trait]
impl SqlOutputParser for VectorSqlOutputParser {
    async fn parse(&self, text: &str) -> Result<String, PromptError> {
        self.substitute(text).await
    }

    fn parser_type(&self) -> &str {
        "vector_sql_parser"
    }
}

/// A `VectorSqlOutputParser` that first rewrites the select list to `*`, so the
/// query returns whole rows whatever columns the model picked.
#[derive(Debug, Clone)]
pub struct VectorSqlRetrieveAllOutputParser {
    inner: VectorSqlOutputParser,
}

impl VectorSqlRetrieveAllOutputParser {
    pub fn new(inner: VectorSqlOutputParser) -> Self {
        Self { inner }
    }

    pub fn from_embeddings(
        model: Box<dyn EmbeddingProvider>,
        distance_func_name: impl Into<String>,
    ) -> Self {
        Self::new(VectorSqlOutputParser::from_embeddings(
            model,
            distance_func_name,
        ))
    }
}

#[async_trait]
impl SqlOutputParser for VectorSqlRetrieveAllOutputParser {
    async fn parse(&self, text: &str) -> Result<String, PromptError> {
        let text = select_all_columns(text.trim());
        self.inner.substitute(&text).await
    }

    fn parser_type(&self) -> &str {
        "vector_sql_retrieve_all_parser"
    }
}

/// Replaces the column list between the first `SELECT` and its `FROM` with `*`.
/// Text without such a pair is returned unchanged.
///
/// A `FROM` inside parentheses (a subquery in the column list) does not end the
/// list. Parentheses inside string literals are counted too.
pub fn select_all_columns(text: &str) -> String {
    let Some(select) = SELECT_REGEX.find(text) else {
        return text.to_string();
    };
    let Some(from) = FROM_REGEX
        .find_iter(&text[select.end()..])
        .find(|m| paren_depth(&text[select.end()..select.end() + m.start()]) == 0)
    else {
        return text.to_string();
    };
    let from_start = select.end() + from.start();

    let columns = text[select.end()..from_start].trim();
    if columns.is_empty() || columns == "*" {
        return text.to_string();
    }

    format!("{} * {}", &text[..select.end()], &text[from_start..])
}

fn paren_depth(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

/// Renders a vector as `[v1,v2,...]`. Whole numbers keep a `.0` so every element
/// reads as a float literal. Callers reject non-finite values first.
pub fn format_vector(values: &[f32]) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|v| {
            if v.is_finite() && v.fract() == 0.0 {
                format!("{v:.1}")
            } else {
                v.to_string()
            }
        })
        .collect();
    format!("[{}]", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vector() {
        assert_eq!(format_vector(&[0.1, 0.2]), "[0.1,0.2]");
        assert_eq!(format_vector(&[1.0, -2.0, 0.5]), "[1.0,-2.0,0.5]");
        assert_eq!(format_vector(&[]), "[]");
    }

    #[test]
    fn test_select_all_columns() {
        assert_eq!(
            select_all_columns("SELECT a, b FROM t WHERE x = 1"),
            "SELECT * FROM t WHERE x = 1"
        );
        assert_eq!(
            select_all_columns("select title,\n  year from films"),
            "select * from films"
        );
    }

    #[test]
    fn test_select_all_columns_leaves_other_text_alone() {
        for text in [
            "SELECT * FROM t",
            "SELECT 1",
            "UPDATE t SET a = 1",
            "SELECT FROM t",
        ] {
            assert_eq!(select_all_columns(text), text);
        }
    }

    #[test]
    fn test_select_all_columns_ignores_keywords_inside_identifiers() {
        assert_eq!(
            select_all_columns("SELECT from_date, selected FROM t"),
            "SELECT * FROM t"
        );
    }

    #[test]
    fn test_select_all_columns_skips_subqueries() {
        assert_eq!(
            select_all_columns("SELECT (SELECT max(x) FROM u) AS m, b FROM t"),
            "SELECT * FROM t"
        );
        assert_eq!(
            select_all_columns("SELECT count(*), b FROM t WHERE id IN (SELECT id FROM u)"),
            "SELECT * FROM t WHERE id IN (SELECT id FROM u)"
        );
    }
}
