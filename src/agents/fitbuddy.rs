use crate::{
    agents::Agent,
    llm::{AgentRun, LLMClient, ToolCallingConfig, ToolCoordinator},
    tools::ToolRegistry,
    types::Result,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Reply for questions outside the fitness domain.
pub const OUT_OF_SCOPE_REPLY: &str = "I'm sorry, I can only help with fitness-related topics.";

pub const SYSTEM_PROMPT: &str = r#"You are FitBuddy, a professional fitness assistant.
You ONLY answer fitness-related questions using documents and fitness knowledge.
If the question is outside fitness, respond with:
"I'm sorry, I can only help with fitness-related topics.""#;

/// Fitness assistant grounded in the indexed documents.
pub struct FitBuddyAgent {
    coordinator: ToolCoordinator,
}

impl FitBuddyAgent {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        tools: Arc<ToolRegistry>,
        config: ToolCallingConfig,
    ) -> Self {
        Self {
            coordinator: ToolCoordinator::new(llm, tools, config),
        }
    }

    /// Run the agent loop and keep the full record.
    pub async fn run(&self, input: &str) -> Result<AgentRun> {
        info!(message = input, "Received user message");
        let run = self.coordinator.execute(SYSTEM_PROMPT, input).await?;
        info!(
            reply = %run.reply,
            iterations = run.iterations,
            tool_calls = run.tool_calls.len(),
            "Agent replied"
        );
        Ok(run)
    }
}

#[async_trait]
impl Agent for FitBuddyAgent {
    async fn execute(&self, input: &str) -> Result<String> {
        Ok(self.run(input).await?.reply)
    }

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }
}
