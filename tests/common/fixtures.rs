//! Shared fixtures: a small fitness corpus and pre-wired components.

use super::mocks::MockEmbedder;
use fitbuddy::db::{LocalVectorStore, VectorStore};
use fitbuddy::rag::{Ingestor, Retriever, TextChunker};
use std::sync::Arc;

pub const COLLECTION: &str = "fitness_docs";

/// One topic per paragraph, each short enough to be its own chunk.
pub const PARAGRAPHS: [&str; 6] = [
    "Running burns roughly 100 calories per mile for an average adult runner.",
    "A deep squat trains the quads, glutes and core in one movement.",
    "Eat about 1.6 grams of protein per kilogram of body weight to build muscle.",
    "Gentle stretching after a workout helps recovery and keeps joints mobile.",
    "Adults who train hard need seven to nine hours of sleep every night.",
    "Drink water before, during and after exercise to stay hydrated.",
];

pub fn corpus() -> String {
    PARAGRAPHS.join("\n\n")
}

/// Splits [`corpus`] into exactly one chunk per paragraph.
pub fn paragraph_chunker() -> TextChunker {
    TextChunker::new(120, 0).expect("valid chunker settings")
}

/// An in-memory store holding the indexed corpus.
pub async fn indexed_store(embedder: Arc<MockEmbedder>) -> Arc<dyn VectorStore> {
    let store: Arc<dyn VectorStore> = Arc::new(LocalVectorStore::in_memory().await.unwrap());
    let ingestor = Ingestor::new(store.clone(), embedder, paragraph_chunker(), COLLECTION);
    ingestor
        .ingest_text("fitnessdataset.pdf", &corpus())
        .await
        .unwrap();
    store
}

pub fn retriever(
    store: Arc<dyn VectorStore>,
    embedder: Arc<MockEmbedder>,
    top_k: usize,
) -> Retriever {
    Retriever::new(store, embedder, COLLECTION, top_k)
}
