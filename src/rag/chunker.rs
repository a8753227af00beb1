use crate::types::{AppError, Result};
use text_splitter::{ChunkConfig, TextSplitter};

/// Character-based splitter with overlap.
///
/// Chunks break on the largest semantic boundary that fits (paragraph, line,
/// sentence, word) and never exceed `chunk_size` characters.
pub struct TextChunker {
    splitter: TextSplitter<text_splitter::Characters>,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::Configuration(format!("Invalid chunking settings: {}", e)))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.splitter.chunks(text).map(str::to_string).collect()
    }
}
