//! Semantic retrieval over the chunk index.

use crate::db::VectorStore;
use crate::rag::embeddings::Embedder;
use crate::types::{Result, SearchResult};
use std::sync::Arc;
use tracing::debug;

/// Embeds a query and returns the `top_k` most similar chunks, best first.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
            top_k,
        }
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed_query(query).await?;
        let results = self
            .store
            .search(&self.collection, &embedding, self.top_k)
            .await?;

        debug!(
            query,
            hits = results.len(),
            top_score = results.first().map(|r| r.score),
            "Retrieved chunks"
        );
        Ok(results)
    }
}
