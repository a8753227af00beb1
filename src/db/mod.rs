//! Vector storage for document chunks.
//!
//! - [`VectorStore`] - the storage seam used by ingestion and retrieval
//! - [`LocalVectorStore`] - embedded, JSON-persisted store (`fitbuddy-vector`)

pub mod local;
pub mod vectorstore;

pub use local::LocalVectorStore;
pub use vectorstore::{IndexedChunk, VectorStore};
