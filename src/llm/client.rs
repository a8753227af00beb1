//! LLM client abstraction
//!
//! The agent loop talks to the model only through [`LLMClient`], so tests can
//! swap in a scripted client and the server can run against Gemini.

use crate::types::{ConversationMessage, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;

/// Chat model with tool calling
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Run one model turn over the full conversation.
    ///
    /// The model may answer with text, with tool calls, or with both.
    async fn generate_with_tools(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Response from an LLM generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g. "STOP", "MAX_TOKENS")
    pub finish_reason: String,
}

impl LLMResponse {
    /// A plain text answer.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            finish_reason: "STOP".to_string(),
        }
    }

    /// A turn that only requests tools.
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
            finish_reason: "STOP".to_string(),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
