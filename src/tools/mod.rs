//! Tools the agent can call
//!
//! - [`registry`](crate::tools::registry) - the [`Tool`] trait and [`ToolRegistry`]
//! - [`retriever`](crate::tools::retriever) - `retriever_tool`, search over the fitness documents

/// Tool registry for managing available tools.
pub mod registry;
/// Document retrieval tool.
pub mod retriever;

pub use registry::{Tool, ToolRegistry};
pub use retriever::RetrieverTool;
