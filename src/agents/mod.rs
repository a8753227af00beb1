//! Agents answering chat messages.

pub mod fitbuddy;

use crate::types::Result;
use async_trait::async_trait;

pub use fitbuddy::FitBuddyAgent;

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer one user message
    async fn execute(&self, input: &str) -> Result<String>;

    /// Get the agent's system prompt
    fn system_prompt(&self) -> String;
}
