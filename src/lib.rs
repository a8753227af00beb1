//! # FitBuddy
//!
//! A retrieval-augmented fitness assistant. A source document is chunked,
//! embedded and indexed once at startup; each `POST /chat` then runs a Gemini
//! agent that may search the index through `retriever_tool` before answering.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use fitbuddy::{AppState, FitConfig, GeminiClient, db::LocalVectorStore, rag::GeminiEmbedder};
//! use std::sync::Arc;
//!
//! let config = FitConfig::load("fitbuddy.toml")?;
//! let api_key = config.api_key()?;
//! let store = Arc::new(LocalVectorStore::open(&config.rag.persist_directory).await?);
//! let embedder = Arc::new(GeminiEmbedder::from_config(&config.llm, &api_key));
//! let llm = Arc::new(GeminiClient::from_config(&config.llm, &api_key));
//!
//! let state = AppState::new(config, llm, embedder, store);
//! let app = state.router()?;
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - The FitBuddy agent and its system prompt
//! - [`api`] - REST API handlers and routes
//! - [`db`] - Vector store for document chunks
//! - [`llm`] - LLM client trait, Gemini client, tool-calling loop
//! - [`rag`] - Loading, chunking, embedding, ingestion and retrieval
//! - [`tools`] - Tool trait, registry and `retriever_tool`
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration

#![warn(rustdoc::missing_crate_level_docs)]

/// The FitBuddy agent.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Vector storage for document chunks.
pub mod db;
/// LLM provider clients and the agent loop.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Agent tools.
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{Agent, FitBuddyAgent};
pub use llm::{GeminiClient, LLMClient, LLMResponse};
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::toml_config::FitConfig;

use crate::db::VectorStore;
use crate::llm::ToolCallingConfig;
use crate::rag::{Embedder, Retriever};
use crate::tools::RetrieverTool;
use axum::Router;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<FitConfig>,
    /// Agent answering chat messages
    pub agent: Arc<dyn Agent>,
    /// Tool registry the agent draws from
    pub tool_registry: Arc<ToolRegistry>,
}

impl AppState {
    /// Wire the retriever tool and the FitBuddy agent over the given backends.
    pub fn new(
        config: FitConfig,
        llm: Arc<dyn LLMClient>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        let retriever = Retriever::new(
            store,
            embedder,
            config.rag.collection.clone(),
            config.rag.top_k,
        );

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(RetrieverTool::new(retriever)));
        let tool_registry = Arc::new(registry);

        let agent = FitBuddyAgent::new(
            llm,
            tool_registry.clone(),
            ToolCallingConfig {
                max_iterations: config.agent.max_iterations,
            },
        );

        Self {
            config: Arc::new(config),
            agent: Arc::new(agent),
            tool_registry,
        }
    }

    /// The HTTP application with this state attached.
    pub fn router(&self) -> Result<Router> {
        Ok(api::routes::create_router(&self.config.server.cors_origin)?.with_state(self.clone()))
    }
}
