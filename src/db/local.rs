//! Embedded vector store backed by `fitbuddy-vector`
//!
//! Chunk fields are kept in the vector metadata under the keys `content`,
//! `source`, `chunk_index` and `fingerprint`, so a persisted index can be
//! searched again without the source document.

use crate::types::{AppError, DocumentChunk, Result, SearchResult};
use async_trait::async_trait;
use fitbuddy_vector::{Config, DistanceMetric, VectorDb, VectorMetadata};
use std::path::PathBuf;
use tracing::{debug, info};

use super::vectorstore::{IndexedChunk, VectorStore};

const CONTENT: &str = "content";
const SOURCE: &str = "source";
const CHUNK_INDEX: &str = "chunk_index";
const FINGERPRINT: &str = "fingerprint";

pub struct LocalVectorStore {
    db: VectorDb,
}

impl LocalVectorStore {
    /// Open a store persisted under `path`, loading any saved collections.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        info!(path = %path.display(), "Opening vector store");
        let db = VectorDb::open(Config::persistent(path)).await?;
        Ok(Self { db })
    }

    /// A store that lives only in memory.
    pub async fn in_memory() -> Result<Self> {
        let db = VectorDb::open(Config::memory()).await?;
        Ok(Self { db })
    }
}

fn to_metadata(chunk: &DocumentChunk) -> VectorMetadata {
    let mut metadata = VectorMetadata::new();
    metadata.insert(CONTENT, chunk.content.as_str());
    metadata.insert(SOURCE, chunk.source.as_str());
    metadata.insert(CHUNK_INDEX, chunk.chunk_index);
    metadata.insert(FINGERPRINT, chunk.fingerprint.as_str());
    metadata
}

fn from_metadata(id: &str, metadata: Option<&VectorMetadata>) -> Result<DocumentChunk> {
    let metadata = metadata
        .ok_or_else(|| AppError::VectorStore(format!("Chunk '{}' has no metadata", id)))?;

    let content = metadata
        .get_string(CONTENT)
        .ok_or_else(|| AppError::VectorStore(format!("Chunk '{}' has no content", id)))?;

    Ok(DocumentChunk {
        id: id.to_string(),
        content: content.to_string(),
        source: metadata.get_string(SOURCE).unwrap_or_default().to_string(),
        chunk_index: metadata
            .get_int(CHUNK_INDEX)
            .and_then(|i| usize::try_from(i).ok())
            .unwrap_or_default(),
        fingerprint: metadata
            .get_string(FINGERPRINT)
            .unwrap_or_default()
            .to_string(),
    })
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.db
            .get_or_create_collection(name, dimensions, DistanceMetric::Cosine)
            .await?;
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.db.collection_exists(name))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        if !self.db.collection_exists(collection) {
            return Ok(0);
        }
        Ok(self.db.count(collection)?)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<DocumentChunk>> {
        if !self.db.collection_exists(collection) {
            return Ok(None);
        }
        self.db
            .get(collection, id)?
            .map(|(_, metadata)| from_metadata(id, metadata.as_ref()))
            .transpose()
    }

    async fn upsert(&self, collection: &str, chunks: &[IndexedChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let written = self
            .db
            .insert_batch(
                collection,
                chunks.iter().map(|c| {
                    (
                        c.chunk.id.as_str(),
                        c.embedding.as_slice(),
                        Some(to_metadata(&c.chunk)),
                    )
                }),
            )
            .await?;

        debug!(collection, written, "Upserted chunks");
        Ok(written)
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if !self.db.collection_exists(collection) {
            debug!(collection, "Search on missing collection");
            return Ok(Vec::new());
        }

        self.db
            .search(collection, embedding, limit)
            .await?
            .into_iter()
            .map(|hit| {
                Ok(SearchResult {
                    chunk: from_metadata(&hit.id, hit.metadata.as_ref())?,
                    score: hit.score,
                })
            })
            .collect()
    }

    async fn persist(&self) -> Result<()> {
        Ok(self.db.persist().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn indexed(index: usize, content: &str, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            chunk: DocumentChunk {
                id: format!("chunk-{}", index),
                content: content.to_string(),
                source: "guide.txt".to_string(),
                chunk_index: index,
                fingerprint: "abc123".to_string(),
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_search_round_trip() {
        let store = LocalVectorStore::in_memory().await.unwrap();
        store.ensure_collection("docs", 2).await.unwrap();

        let written = store
            .upsert(
                "docs",
                &[
                    indexed(0, "Squats build legs", vec![1.0, 0.0]),
                    indexed(1, "Rowing builds backs", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();
        assert_eq!(written, 2);

        let results = store.search("docs", &[0.9, 0.1], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "Squats build legs");
        assert_eq!(results[0].chunk.chunk_index, 0);
        assert_eq!(results[0].chunk.fingerprint, "abc123");
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let store = LocalVectorStore::in_memory().await.unwrap();
        store.ensure_collection("docs", 2).await.unwrap();

        store
            .upsert("docs", &[indexed(0, "old", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert("docs", &[indexed(0, "new", vec![1.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(store.count("docs").await.unwrap(), 1);
        let chunk = store.get("docs", "chunk-0").await.unwrap().unwrap();
        assert_eq!(chunk.content, "new");
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = LocalVectorStore::in_memory().await.unwrap();
        assert!(!store.collection_exists("docs").await.unwrap());
        assert_eq!(store.count("docs").await.unwrap(), 0);
        assert!(store.get("docs", "x").await.unwrap().is_none());
        assert!(store.search("docs", &[1.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_vector_store_error() {
        let store = LocalVectorStore::in_memory().await.unwrap();
        store.ensure_collection("docs", 2).await.unwrap();
        let err = store.ensure_collection("docs", 3).await.unwrap_err();
        assert!(matches!(err, AppError::VectorStore(_)));
    }

    #[tokio::test]
    async fn test_persisted_chunks_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = LocalVectorStore::open(temp_dir.path()).await.unwrap();
            store.ensure_collection("docs", 2).await.unwrap();
            store
                .upsert("docs", &[indexed(0, "Stretch after runs", vec![0.0, 1.0])])
                .await
                .unwrap();
            store.persist().await.unwrap();
        }

        let store = LocalVectorStore::open(temp_dir.path()).await.unwrap();
        let results = store.search("docs", &[0.0, 1.0], 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "Stretch after runs");
        assert_eq!(results[0].chunk.source, "guide.txt");
    }
}
