//! Configuration utilities.

/// TOML configuration with environment overrides.
pub mod toml_config;

pub use toml_config::{AgentConfig, ConfigError, FitConfig, LlmConfig, RagConfig, ServerConfig};
