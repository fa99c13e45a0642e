//! # HTTP Provider Tests
//!
//! Runs the Gemini, OpenAI-compatible and embedding providers against a local
//! `wiremock` server and checks the payloads they send.

mod common;

use common::setup_tracing;
use serde_json::json;
use vectorsql::{
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider, ApiEmbeddingProvider, EmbeddingProvider},
        factory::{create_ai_provider, create_embedding_provider},
    },
    types::{EmbeddingConfig, ProviderConfig},
    PromptError,
};
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn stop() -> Vec<String> {
    vec!["\nSQLResult:".to_string()]
}

#[tokio::test]
async fn test_gemini_sends_stop_sequences_and_key() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(query_param("key", "secret"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "Be precise."}]},
            "contents": [{"role": "user", "parts": [{"text": "Question: robots"}]}],
            "generationConfig": {"stopSequences": ["\nSQLResult:"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"text": "SELECT 1"},
                {"text": "\nSQLResult: 1"}
            ]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(
        format!("{}/v1beta/models/gemini-test:generateContent", server.uri()),
        "secret".to_string(),
    )
    .unwrap();

    let text = provider
        .generate_with_stop("Be precise.", "Question: robots", &stop())
        .await
        .unwrap();
    assert_eq!(text, "SELECT 1");
}

#[tokio::test]
async fn test_local_provider_sends_openai_payload() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer local-key"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "messages": [
                {"role": "system", "content": "Be precise."},
                {"role": "user", "content": "Question: robots"}
            ],
            "stop": ["\nSQLResult:"],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "SELECT 2\nSQLResult: 2"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = LocalAiProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        Some("local-key".to_string()),
        Some("llama3".to_string()),
    )
    .unwrap();

    // The server ignores `stop`; the provider still truncates.
    let text = provider
        .generate_with_stop("Be precise.", "Question: robots", &stop())
        .await
        .unwrap();
    assert_eq!(text, "SELECT 2");
}

#[tokio::test]
async fn test_local_provider_reports_api_errors() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .mount(&server)
        .await;

    let provider = LocalAiProvider::new(server.uri(), None, None).unwrap();
    let result = provider.generate("", "hello").await;

    match result {
        Err(PromptError::AiApi(msg)) => assert_eq!(msg, "model overloaded"),
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_compatible_embeddings() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({"model": "embed-small", "input": "robots"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.25, -0.5, 1.0]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ApiEmbeddingProvider::new(
        format!("{}/v1/embeddings", server.uri()),
        "embed-small".to_string(),
        None,
    )
    .unwrap();

    let vector = provider.embed_query("robots").await.unwrap();
    assert_eq!(vector, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn test_empty_embedding_response_is_an_error() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let provider = ApiEmbeddingProvider::new(server.uri(), "embed-small".to_string(), None).unwrap();
    assert!(matches!(
        provider.embed_query("robots").await,
        Err(PromptError::AiApi(_))
    ));
}

#[tokio::test]
async fn test_factory_builds_configured_providers() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "pong"}}]
        })))
        .mount(&server)
        .await;

    let ai = create_ai_provider(&ProviderConfig {
        provider: "local".to_string(),
        api_url: Some(format!("{}/chat", server.uri())),
        api_key: None,
        model_name: "llama3".to_string(),
    })
    .unwrap();
    assert_eq!(ai.generate("", "ping").await.unwrap(), "pong");

    let embedding = create_embedding_provider(&EmbeddingConfig {
        api_url: format!("{}/embed", server.uri()),
        model_name: "embed-small".to_string(),
        api_key: None,
    });
    assert!(embedding.is_ok());
}

#[test]
fn test_factory_rejects_incomplete_configuration() {
    let gemini_without_key = create_ai_provider(&ProviderConfig {
        provider: "gemini".to_string(),
        api_url: None,
        api_key: None,
        model_name: "gemini-2.0-flash".to_string(),
    });
    assert!(matches!(
        gemini_without_key,
        Err(PromptError::MissingAiProvider(_))
    ));

    let unknown = create_ai_provider(&ProviderConfig {
        provider: "carrier-pigeon".to_string(),
        api_url: Some("http://localhost".to_string()),
        api_key: None,
        model_name: "coo".to_string(),
    });
    assert!(matches!(unknown, Err(PromptError::MissingAiProvider(_))));
}
