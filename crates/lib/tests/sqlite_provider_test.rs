//! # SQLite Provider Tests
//!
//! Verifies the `SqliteProvider` storage backend: statement execution in both
//! fetch modes and the table descriptions handed to the SQL prompt.
//!
//! Each test uses its own in-memory database, so no file system cleanup is needed.

mod common;

use crate::common::{row, setup_tracing, MockEmbeddingProvider};
use serde_json::json;
use vectorsql::providers::db::{
    sqlite::{sql::VECTOR_LITERAL, SqliteProvider},
    storage::Storage,
};
use vectorsql::{FetchMode, PromptError, SqlOutputParser, SqlResult, VectorSqlOutputParser};

const SEED_SQL: &str = "
    CREATE TABLE films (id INTEGER PRIMARY KEY, title TEXT NOT NULL, rating REAL);
    INSERT INTO films (id, title, rating) VALUES (1, 'Alien', 8.5);
    INSERT INTO films (id, title, rating) VALUES (2, 'Brazil', 7.9);
    INSERT INTO films (id, title, rating) VALUES (3, 'Cube', NULL);
    CREATE TABLE actors (id INTEGER PRIMARY KEY, name TEXT);
";

async fn seeded_provider() -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create SqliteProvider");
    provider
        .initialize_with_data(SEED_SQL)
        .await
        .expect("Failed to initialize database with test data");
    provider
}

#[tokio::test]
async fn test_execute_fetch_all_keeps_column_order() {
    setup_tracing();
    let provider = seeded_provider().await;

    let result = provider
        .execute("SELECT title, id, rating FROM films ORDER BY id", FetchMode::All)
        .await
        .expect("Failed to execute query");

    let SqlResult::Rows(rows) = result else {
        panic!("expected a row sequence");
    };
    assert_eq!(rows.len(), 3);
    let columns: Vec<&String> = rows[0].keys().collect();
    assert_eq!(columns, ["title", "id", "rating"]);
    assert_eq!(
        serde_json::to_value(&rows).unwrap(),
        json!([
            {"title": "Alien", "id": 1, "rating": 8.5},
            {"title": "Brazil", "id": 2, "rating": 7.9},
            {"title": "Cube", "id": 3, "rating": null}
        ])
    );
}

#[tokio::test]
async fn test_execute_fetch_one() {
    setup_tracing();
    let provider = seeded_provider().await;

    let one = provider
        .execute("SELECT COUNT(*) AS n FROM films", FetchMode::One)
        .await
        .unwrap();
    assert_eq!(one.to_string(), r#"{"n":3}"#);

    let none = provider
        .execute("SELECT id FROM films WHERE id > 100", FetchMode::One)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_execute_invalid_sql_fails() {
    setup_tracing();
    let provider = seeded_provider().await;

    let result = provider
        .execute("SELECT missing_column FROM films", FetchMode::All)
        .await;
    assert!(matches!(
        result,
        Err(PromptError::StorageOperationFailed(_))
    ));
}

#[tokio::test]
async fn test_table_info_includes_ddl_and_samples() {
    setup_tracing();
    let provider = seeded_provider().await.with_sample_rows_in_table_info(2);

    let info = provider
        .get_table_info(Some(&["films".to_string()]))
        .await
        .unwrap();

    assert!(info.starts_with("CREATE TABLE films"));
    assert!(info.contains("/*\n2 rows from films table:\nid\ttitle\trating\n"));
    assert!(info.contains("1\tAlien\t8.5"));
    assert!(info.contains("2\tBrazil\t7.9"));
    assert!(!info.contains("Cube"), "only the requested number of sample rows");
    assert!(!info.contains("CREATE TABLE actors"));
    assert!(info.ends_with("*/"));
}

#[tokio::test]
async fn test_table_info_for_all_tables() {
    setup_tracing();
    let provider = seeded_provider().await.with_sample_rows_in_table_info(0);

    let info = provider.get_table_info(None).await.unwrap();

    // Tables are described in name order, without sample blocks.
    let actors = info.find("CREATE TABLE actors").unwrap();
    let films = info.find("CREATE TABLE films").unwrap();
    assert!(actors < films);
    assert!(!info.contains("/*"));
}

#[tokio::test]
async fn test_table_info_rejects_unknown_tables() {
    setup_tracing();
    let provider = seeded_provider().await;

    let result = provider
        .get_table_info(Some(&["films".to_string(), "directors".to_string()]))
        .await;

    match result {
        Err(PromptError::StorageOperationFailed(msg)) => assert!(msg.contains("directors")),
        other => panic!("expected a missing table error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sqlite_in_memory_is_isolated() {
    setup_tracing();
    let provider1 = seeded_provider().await;
    let provider2 = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create provider 2");

    assert_eq!(provider1.list_tables().await.unwrap().len(), 2);
    assert!(provider2.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_parsed_vector_query_runs_on_turso() {
    setup_tracing();
    let provider = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create SqliteProvider");
    provider
        .initialize_with_data(
            "
            CREATE TABLE films (title TEXT, embedding F32_BLOB(2));
            INSERT INTO films (title, embedding) VALUES ('Robots', vector32('[1.0, 0.0]'));
            INSERT INTO films (title, embedding) VALUES ('Cooking', vector32('[0.0, 1.0]'));
        ",
        )
        .await
        .expect("Failed to seed vector table");

    let model = MockEmbeddingProvider::new(vec![0.9, 0.1]);
    let parser = VectorSqlOutputParser::from_embeddings(Box::new(model), "vector_distance_cos")
        .with_vector_literal(VECTOR_LITERAL);

    let sql = parser
        .parse("SELECT title FROM films ORDER BY DISTANCE(embedding, NeuralArray(robots)) LIMIT 1;")
        .await
        .unwrap();
    assert_eq!(
        sql,
        "SELECT title FROM films ORDER BY vector_distance_cos(embedding, vector32('[0.9,0.1]')) LIMIT 1"
    );

    let result = provider.execute(&sql, FetchMode::All).await.unwrap();
    assert_eq!(result, SqlResult::Rows(vec![row(&[("title", json!("Robots"))])]));
}
