//! Vector store abstraction
//!
//! Ingestion writes chunks through [`VectorStore`] and the retriever reads
//! them back. [`LocalVectorStore`](super::local::LocalVectorStore) is the
//! embedded implementation backed by `fitbuddy-vector`.

use crate::types::{DocumentChunk, Result, SearchResult};
use async_trait::async_trait;

/// A chunk paired with its embedding, ready to be written.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: DocumentChunk,
    pub embedding: Vec<f32>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if needed. Existing collections must match `dimensions`.
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Number of chunks in a collection; zero if it does not exist.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Fetch a chunk by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<DocumentChunk>>;

    /// Insert or replace chunks by id. Returns the number written.
    async fn upsert(&self, collection: &str, chunks: &[IndexedChunk]) -> Result<usize>;

    /// The `limit` chunks most similar to `embedding`, best first.
    ///
    /// A collection that does not exist yields no results.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Flush pending writes to durable storage.
    async fn persist(&self) -> Result<()>;
}
