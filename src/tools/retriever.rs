use crate::rag::Retriever;
use crate::tools::registry::Tool;
use crate::types::{Result, SearchResult};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Returned when a search finds nothing.
pub const NO_RESULTS: &str = "Sorry, no relevant information was found.";

/// Document search exposed to the model as `retriever_tool`.
pub struct RetrieverTool {
    retriever: Retriever,
}

impl RetrieverTool {
    pub const NAME: &'static str = "retriever_tool";

    pub fn new(retriever: Retriever) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for RetrieverTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search fitness documents and return the most relevant information."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look up in the fitness documents"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = args["query"].as_str().unwrap_or_default();
        let results = self.retriever.retrieve(query).await?;
        Ok(Value::String(format_results(&results)))
    }
}

/// Numbered listing of chunk texts, one blank line apart.
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r.chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
