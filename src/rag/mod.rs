//! Retrieval Augmented Generation (RAG) pipeline
//!
//! 1. **Loading** - [`loader`] reads the source document (PDF or text)
//! 2. **Chunking** - [`chunker`] splits it into overlapping chunks
//! 3. **Embedding** - [`embeddings`] turns chunks and queries into vectors
//! 4. **Indexing** - [`ingest`] writes chunks to the vector store once
//! 5. **Retrieval** - [`search`] returns the top-k chunks for a query

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod loader;
pub mod search;

pub use chunker::TextChunker;
pub use embeddings::{Embedder, GeminiEmbedder};
pub use ingest::{IngestReport, Ingestor};
pub use search::Retriever;
