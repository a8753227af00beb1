//! Integration tests for the Gemini REST clients
//!
//! These tests use wiremock to stand in for the Gemini API and validate:
//! - Request shape (path, API key header, roles, tools, task types)
//! - Text and function-call response parsing
//! - Error propagation for non-2xx responses
//! - Embedding batches of at most 100 texts
//! - A full `/chat` round trip over both clients

use axum_test::TestServer;
use fitbuddy::db::{LocalVectorStore, VectorStore};
use fitbuddy::llm::{GeminiClient, LLMClient};
use fitbuddy::rag::{Embedder, GeminiEmbedder, Ingestor, TextChunker};
use fitbuddy::types::{AppError, ConversationMessage, ToolDefinition};
use fitbuddy::{AppState, FitConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const API_KEY: &str = "test-key";

// ============= Helper Functions =============

fn base_url(server: &MockServer) -> String {
    format!("{}/v1beta", server.uri())
}

fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn function_call_response(query: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [
                {"functionCall": {"name": "retriever_tool", "args": {"query": query}}}
            ]},
            "finishReason": "STOP"
        }]
    })
}

fn retriever_definition() -> ToolDefinition {
    ToolDefinition {
        name: "retriever_tool".to_string(),
        description: "Search fitness documents and return the most relevant information."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        }),
    }
}

/// Answers `batchEmbedContents` with one embedding per request, and
/// `embedContent` with a single embedding.
struct EmbeddingResponder;

impl Respond for EmbeddingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        match body["requests"].as_array() {
            Some(requests) => {
                let embeddings: Vec<Value> = requests
                    .iter()
                    .map(|r| json!({"values": keyword_vector(r["content"]["parts"][0]["text"].as_str().unwrap_or_default())}))
                    .collect();
                ResponseTemplate::new(200).set_body_json(json!({"embeddings": embeddings}))
            }
            None => {
                let text = body["content"]["parts"][0]["text"].as_str().unwrap_or_default();
                ResponseTemplate::new(200)
                    .set_body_json(json!({"embedding": {"values": keyword_vector(text)}}))
            }
        }
    }
}

fn keyword_vector(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    ["running", "squat", "sleep"]
        .iter()
        .map(|k| if text.contains(k) { 1.0 } else { 0.0 })
        .chain(std::iter::once(0.1))
        .collect()
}

// ============= Chat Client Tests =============

#[tokio::test]
async fn test_generate_sends_key_and_parses_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", API_KEY))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "You are FitBuddy."}]},
            "contents": [{"role": "user", "parts": [{"text": "Hi"}]}],
            "generationConfig": {"temperature": 0.5}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Hello, athlete!")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GeminiClient::new(API_KEY, base_url(&mock_server), "gemini-1.5-flash", 0.5);
    let messages = vec![
        ConversationMessage::system("You are FitBuddy."),
        ConversationMessage::user("Hi"),
    ];

    let response = client.generate_with_tools(&messages, &[]).await.unwrap();

    assert_eq!(response.content, "Hello, athlete!");
    assert!(response.tool_calls.is_empty());
    assert_eq!(client.model_name(), "gemini-1.5-flash");
}

#[tokio::test]
async fn test_generate_declares_tools_and_parses_function_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "tools": [{"functionDeclarations": [{"name": "retriever_tool"}]}]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(function_call_response("squat form")),
        )
        .mount(&mock_server)
        .await;

    let client = GeminiClient::new(
        API_KEY,
        base_url(&mock_server),
        "models/gemini-1.5-flash",
        0.7,
    );
    let response = client
        .generate_with_tools(
            &[ConversationMessage::user("How do I squat?")],
            &[retriever_definition()],
        )
        .await
        .unwrap();

    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "retriever_tool");
    assert_eq!(response.tool_calls[0].arguments, json!({"query": "squat form"}));
    assert!(response.tool_calls[0].id.starts_with("call_"));
}

#[tokio::test]
async fn test_generate_error_status_is_llm_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid"}
        })))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::new("bad-key", base_url(&mock_server), "gemini-1.5-flash", 0.7);
    let err = client
        .generate_with_tools(&[ConversationMessage::user("Hi")], &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::LLM(_)));
    assert!(err.to_string().contains("403"));
    assert!(err.to_string().contains("API key not valid"));
}

// ============= Embedding Client Tests =============

#[tokio::test]
async fn test_documents_embedded_in_batches_of_100() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/embedding-001:batchEmbedContents"))
        .and(header("x-goog-api-key", API_KEY))
        .and(body_string_contains("RETRIEVAL_DOCUMENT"))
        .respond_with(EmbeddingResponder)
        .expect(2)
        .mount(&mock_server)
        .await;

    let embedder = GeminiEmbedder::new(API_KEY, base_url(&mock_server), "models/embedding-001");
    let texts: Vec<String> = (0..150).map(|i| format!("sleep tip {}", i)).collect();

    let vectors = embedder.embed_documents(&texts).await.unwrap();

    assert_eq!(vectors.len(), 150);
    assert!(vectors.iter().all(|v| v == &vec![0.0, 0.0, 1.0, 0.1]));
}

#[tokio::test]
async fn test_query_uses_retrieval_query_task() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/embedding-001:embedContent"))
        .and(body_partial_json(json!({
            "model": "models/embedding-001",
            "taskType": "RETRIEVAL_QUERY"
        })))
        .respond_with(EmbeddingResponder)
        .expect(1)
        .mount(&mock_server)
        .await;

    let embedder = GeminiEmbedder::new(API_KEY, base_url(&mock_server), "embedding-001");
    let vector = embedder.embed_query("running pace").await.unwrap();

    assert_eq!(vector, vec![1.0, 0.0, 0.0, 0.1]);
}

#[tokio::test]
async fn test_embedding_error_status_is_embedding_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&mock_server)
        .await;

    let embedder = GeminiEmbedder::new(API_KEY, base_url(&mock_server), "embedding-001");
    let err = embedder.embed_query("squat").await.unwrap_err();

    assert!(matches!(err, AppError::Embedding(_)));
}

// ============= End-to-End =============

#[tokio::test]
async fn test_chat_round_trip_over_gemini() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/embedding-001:batchEmbedContents"))
        .respond_with(EmbeddingResponder)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/embedding-001:embedContent"))
        .respond_with(EmbeddingResponder)
        .mount(&mock_server)
        .await;

    // The follow-up turn carries the tool result; the first turn does not.
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(body_string_contains("functionResponse"))
        .and(body_string_contains("100 calories per mile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response("Running burns about 100 calories per mile.")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(function_call_response("running calories")),
        )
        .mount(&mock_server)
        .await;

    let mut config = FitConfig::default();
    config.llm.base_url = base_url(&mock_server);

    let store: Arc<dyn VectorStore> = Arc::new(LocalVectorStore::in_memory().await.unwrap());
    let embedder: Arc<dyn Embedder> =
        Arc::new(GeminiEmbedder::from_config(&config.llm, API_KEY));
    Ingestor::new(
        store.clone(),
        embedder.clone(),
        TextChunker::new(120, 0).unwrap(),
        config.rag.collection.clone(),
    )
    .ingest_text(
        "fitness.md",
        "Running burns about 100 calories per mile.\n\n\
         A full squat works the whole lower body and the core muscles.\n\n\
         Most adults need seven to nine hours of sleep to recover from training.",
    )
    .await
    .unwrap();

    let llm = Arc::new(GeminiClient::from_config(&config.llm, API_KEY));
    let state = AppState::new(config, llm, embedder, store);
    let server = TestServer::new(state.router().unwrap()).unwrap();

    let response = server
        .post("/chat")
        .json(&json!({"message": "How many calories does running burn?"}))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({"reply": "Running burns about 100 calories per mile."}));
}
