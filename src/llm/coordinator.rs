//! Tool-calling agent loop
//!
//! [`ToolCoordinator`] drives one conversation through three states:
//!
//! ```text
//!            tool calls
//!   Model ──────────────▶ ToolExec
//!     ▲  │                   │
//!     │  │ no tool calls     │ one result per call
//!     │  ▼                   │
//!     │ Done                 │
//!     └──────────────────────┘
//! ```
//!
//! Every tool call the model issues is answered by exactly one tool result
//! with the same id before the model is invoked again. Model and tool
//! failures propagate unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! let coordinator = ToolCoordinator::new(client, registry, ToolCallingConfig::default());
//! let run = coordinator.execute(SYSTEM_PROMPT, "Is stretching before running useful?").await?;
//! println!("{} ({} model turns)", run.reply, run.iterations);
//! ```

use crate::llm::client::LLMClient;
use crate::tools::registry::ToolRegistry;
use crate::types::{AppError, ConversationMessage, Result, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Configuration for the tool-calling loop.
#[derive(Debug, Clone)]
pub struct ToolCallingConfig {
    /// Maximum number of model turns (not tool calls) in one run.
    pub max_iterations: usize,
}

impl Default for ToolCallingConfig {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

/// Where the loop is.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// Invoke the model with the full conversation.
    Model,
    /// Run these calls in order, then return to `Model`.
    ToolExec(Vec<ToolCall>),
    /// The last assistant message is the reply.
    Done,
}

/// Record of a single tool call execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Correlation id shared by the call and its result.
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Text handed back to the model.
    pub result: String,
    pub duration_ms: u64,
}

/// Outcome of one complete agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    /// Final text answer.
    pub reply: String,
    /// Number of model turns taken.
    pub iterations: usize,
    /// Every tool call made, in order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Full conversation, system instruction first.
    pub message_history: Vec<ConversationMessage>,
}

pub struct ToolCoordinator {
    client: Arc<dyn LLMClient>,
    registry: Arc<ToolRegistry>,
    config: ToolCallingConfig,
}

impl ToolCoordinator {
    pub fn new(
        client: Arc<dyn LLMClient>,
        registry: Arc<ToolRegistry>,
        config: ToolCallingConfig,
    ) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    /// Run the loop from `[system, user]` until the model stops calling tools.
    ///
    /// # Errors
    ///
    /// Model and tool errors are returned as-is. An unknown tool name, or more
    /// than `max_iterations` model turns, is [`AppError::Agent`].
    pub async fn execute(&self, system: &str, prompt: &str) -> Result<AgentRun> {
        let tools = self.registry.get_tool_definitions();
        let mut messages = vec![
            ConversationMessage::system(system),
            ConversationMessage::user(prompt),
        ];
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut iterations = 0;
        let mut step = AgentStep::Model;

        loop {
            step = match step {
                AgentStep::Model => {
                    if iterations == self.config.max_iterations {
                        warn!(iterations, "Agent hit the iteration limit");
                        return Err(AppError::Agent(format!(
                            "No final answer after {} model turns",
                            iterations
                        )));
                    }
                    iterations += 1;

                    let response = self.client.generate_with_tools(&messages, &tools).await?;
                    debug!(
                        iteration = iterations,
                        tool_calls = response.tool_calls.len(),
                        finish_reason = %response.finish_reason,
                        "Model turn complete"
                    );

                    messages.push(ConversationMessage::assistant(
                        response.content,
                        response.tool_calls.clone(),
                    ));

                    if response.tool_calls.is_empty() {
                        AgentStep::Done
                    } else {
                        AgentStep::ToolExec(response.tool_calls)
                    }
                }
                AgentStep::ToolExec(calls) => {
                    for call in &calls {
                        let record = self.execute_single_tool(call).await?;
                        messages.push(ConversationMessage::tool_result(call, &record.result));
                        records.push(record);
                    }
                    AgentStep::Model
                }
                AgentStep::Done => break,
            };
        }

        let reply = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(AgentRun {
            reply,
            iterations,
            tool_calls: records,
            message_history: messages,
        })
    }

    async fn execute_single_tool(&self, call: &ToolCall) -> Result<ToolCallRecord> {
        let start = Instant::now();
        debug!(id = %call.id, tool = %call.name, args = %call.arguments, "Executing tool");

        let value = self
            .registry
            .execute(&call.name, call.arguments.clone())
            .await?;

        Ok(ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result: value_to_text(value),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Tool output as the model sees it: strings verbatim, anything else as JSON.
fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
