//! Mock implementations for testing.
//!
//! - [`MockLLMClient`] replays scripted model turns and records what it saw
//! - [`MockEmbedder`] maps text to keyword-count vectors, so similarity is
//!   predictable without a real embedding model

use async_trait::async_trait;
use fitbuddy::llm::{LLMClient, LLMResponse};
use fitbuddy::rag::Embedder;
use fitbuddy::types::{AppError, ConversationMessage, Result, ToolCall, ToolDefinition};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Script {
    /// Answer every turn with this response.
    Repeat(LLMResponse),
    /// Answer turns in order; running out is an error.
    Queue(Mutex<VecDeque<LLMResponse>>),
    Fail,
}

/// Mock LLM client with configurable responses.
///
/// ```ignore
/// // Always answers with text
/// let client = MockLLMClient::new("Drink water.");
///
/// // Calls the retriever first, then answers
/// let client = MockLLMClient::scripted(vec![
///     LLMResponse::with_tool_calls(vec![retriever_call("c1", "hydration")]),
///     LLMResponse::text("Drink water."),
/// ]);
/// ```
pub struct MockLLMClient {
    script: Script,
    calls: Mutex<Vec<Vec<ConversationMessage>>>,
}

impl MockLLMClient {
    /// A client that always returns the given text.
    pub fn new(response: &str) -> Self {
        Self::with_script(Script::Repeat(LLMResponse::text(response)))
    }

    /// A client that returns `responses` one per turn.
    pub fn scripted(responses: Vec<LLMResponse>) -> Self {
        Self::with_script(Script::Queue(Mutex::new(responses.into())))
    }

    /// A client that requests the same tool calls on every turn.
    pub fn always_calling(tool_calls: Vec<ToolCall>) -> Self {
        Self::with_script(Script::Repeat(LLMResponse::with_tool_calls(tool_calls)))
    }

    /// A client that always returns an error.
    pub fn failing() -> Self {
        Self::with_script(Script::Fail)
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of model turns served.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// The conversation passed on turn `index`.
    pub fn messages_for_call(&self, index: usize) -> Vec<ConversationMessage> {
        self.calls.lock()[index].clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_tools(
        &self,
        messages: &[ConversationMessage],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.calls.lock().push(messages.to_vec());

        match &self.script {
            Script::Repeat(response) => Ok(response.clone()),
            Script::Queue(queue) => queue
                .lock()
                .pop_front()
                .ok_or_else(|| AppError::LLM("Mock script exhausted".to_string())),
            Script::Fail => Err(AppError::LLM("Mock LLM failure".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// A `retriever_tool` call with the given id and query.
pub fn retriever_call(id: &str, query: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "retriever_tool".to_string(),
        arguments: json!({ "query": query }),
    }
}

/// Embeds text as counts of a fixed keyword list, plus a constant component
/// so no vector is all zeros.
pub struct MockEmbedder {
    vocabulary: Vec<String>,
    document_calls: AtomicUsize,
    embedded_documents: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_lowercase()).collect(),
            document_calls: AtomicUsize::new(0),
            embedded_documents: AtomicUsize::new(0),
        }
    }

    /// A vocabulary covering the fitness fixtures used across tests.
    pub fn fitness() -> Self {
        Self::new(&[
            "running", "calories", "squat", "protein", "stretching", "sleep", "water",
        ])
    }

    pub fn dimensions(&self) -> usize {
        self.vocabulary.len() + 1
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut vector: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|term| words.iter().filter(|w| w.starts_with(term.as_str())).count() as f32)
            .collect();
        vector.push(0.1);
        vector
    }

    /// Number of `embed_documents` calls made.
    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    /// Total number of texts embedded via `embed_documents`.
    pub fn embedded_documents(&self) -> usize {
        self.embedded_documents.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        self.embedded_documents
            .fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}
