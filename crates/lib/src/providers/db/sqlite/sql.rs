//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL query strings for the SQLite provider.

/// Lists user tables with their `CREATE` statements, ordered by name.
pub const LIST_TABLES_SQL: &str =
    "SELECT name, sql FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name;";

/// Turso reads a bare `[..]` as a quoted identifier; vectors go through `vector32`.
pub const VECTOR_LITERAL: &str = "vector32('{}')";

/// Quotes an identifier for use in a statement.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Returns the query that fetches the first `limit` rows of `table_name`.
pub fn sample_rows(table_name: &str, limit: usize) -> String {
    format!(
        "SELECT * FROM {} LIMIT {limit};",
        quote_identifier(table_name)
    )
}
