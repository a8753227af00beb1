//! LLM client abstraction, the Gemini provider and the tool-calling loop
//!
//! - [`LLMClient`] - the trait the agent loop drives
//! - [`GeminiClient`] - Google Gemini `generateContent` over REST
//! - [`ToolCoordinator`] - runs model turns and tool calls until a final answer

/// Core LLM client trait and response type.
pub mod client;
/// Generic tool-calling loop over any [`LLMClient`].
pub mod coordinator;
/// Google Gemini chat client.
pub mod gemini;

pub use client::{LLMClient, LLMResponse};
pub use coordinator::{AgentRun, AgentStep, ToolCallRecord, ToolCallingConfig, ToolCoordinator};
pub use gemini::GeminiClient;
