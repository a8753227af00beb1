//! Startup ingestion: load, chunk, embed, upsert, persist.
//!
//! Chunk ids derive from the document fingerprint and the chunk position, so
//! re-ingesting an unchanged document finds every id already present and
//! skips the embedding calls entirely.

use crate::db::{IndexedChunk, VectorStore};
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::Embedder;
use crate::rag::loader::load_document;
use crate::types::{AppError, DocumentChunk, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// What an ingestion run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source: String,
    pub fingerprint: String,
    pub chunks: usize,
    /// Number of chunks embedded and written; zero when the index was current.
    pub upserted: usize,
    pub skipped: bool,
}

pub struct Ingestor {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    chunker: TextChunker,
    collection: String,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        chunker: TextChunker,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedder,
            chunker,
            collection: collection.into(),
        }
    }

    /// Ingest the document at `path`.
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestReport> {
        let text = load_document(path).await?;
        self.ingest_text(&path.display().to_string(), &text).await
    }

    /// Ingest already-loaded text under the given source name.
    pub async fn ingest_text(&self, source: &str, text: &str) -> Result<IngestReport> {
        let fingerprint = fingerprint(text);
        let chunks: Vec<DocumentChunk> = self
            .chunker
            .chunk(text)
            .into_iter()
            .enumerate()
            .map(|(index, content)| DocumentChunk {
                id: chunk_id(&fingerprint, index),
                content,
                source: source.to_string(),
                chunk_index: index,
                fingerprint: fingerprint.clone(),
            })
            .collect();

        if chunks.is_empty() {
            return Err(AppError::Document(format!(
                "{} produced no chunks",
                source
            )));
        }

        info!(
            source,
            fingerprint = %&fingerprint[..12],
            chunks = chunks.len(),
            "Chunked source document"
        );

        if self.is_current(&chunks).await? {
            info!(collection = %self.collection, "Index is current, skipping embedding");
            return Ok(IngestReport {
                source: source.to_string(),
                fingerprint,
                chunks: chunks.len(),
                upserted: 0,
                skipped: true,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or_default();
        self.store
            .ensure_collection(&self.collection, dimensions)
            .await?;

        let indexed: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();
        let upserted = self.store.upsert(&self.collection, &indexed).await?;
        self.store.persist().await?;

        info!(
            collection = %self.collection,
            upserted,
            dimensions,
            "Indexed source document"
        );

        Ok(IngestReport {
            source: source.to_string(),
            fingerprint,
            chunks: indexed.len(),
            upserted,
            skipped: false,
        })
    }

    async fn is_current(&self, chunks: &[DocumentChunk]) -> Result<bool> {
        if !self.store.collection_exists(&self.collection).await? {
            return Ok(false);
        }
        for chunk in chunks {
            if self.store.get(&self.collection, &chunk.id).await?.is_none() {
                debug!(id = %chunk.id, "Chunk missing from index");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// SHA-256 hex digest of a document's text.
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Deterministic id of the chunk at `index` of the document with `fingerprint`.
pub fn chunk_id(fingerprint: &str, index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update(index.to_le_bytes());
    hex::encode(hasher.finalize())
}
