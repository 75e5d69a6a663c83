//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Sizes are measured in characters, not bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target maximum chunk size
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "chunk_overlap must be less than chunk_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Position of a chunk inside its source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Index of this chunk (0-based)
    pub chunk_index: usize,
    /// Character offset where this chunk starts
    pub start_offset: usize,
    /// Length of the chunk in characters
    pub char_len: usize,
}

impl ChunkMetadata {
    pub fn new(chunk_index: usize, start_offset: usize, char_len: usize) -> Self {
        Self {
            chunk_index,
            start_offset,
            char_len,
        }
    }

    /// Character offset one past the end of the chunk
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.char_len
    }
}

/// A chunk of text extracted from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn start_offset(&self) -> usize {
        self.metadata.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Trait for chunking strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split content into chunks with strictly increasing start offsets
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError>;

    fn name(&self) -> &'static str;
}

/// Rebuild the source text from chunks by dropping each chunk's overlap with its predecessor
pub fn reassemble(chunks: &[Chunk]) -> String {
    let mut text = String::new();
    let mut covered: usize = 0;

    for chunk in chunks {
        let skip = covered.saturating_sub(chunk.metadata.start_offset);
        text.extend(chunk.content.chars().skip(skip));
        covered = covered.max(chunk.metadata.end_offset());
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunking_config_default() {
        let config = ChunkingConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
    }

    #[test]
    fn test_chunking_config_validation() {
        assert!(ChunkingConfig::new(100, 50).validate().is_ok());
        assert!(ChunkingConfig::new(0, 0).validate().is_err());
        assert!(ChunkingConfig::new(100, 100).validate().is_err());
    }

    #[test]
    fn test_reassemble_drops_overlap() {
        let chunks = vec![
            Chunk::new("hello wor", ChunkMetadata::new(0, 0, 9)),
            Chunk::new("world", ChunkMetadata::new(1, 6, 5)),
        ];
        assert_eq!(reassemble(&chunks), "hello world");
    }

    #[test]
    fn test_reassemble_counts_chars() {
        let chunks = vec![
            Chunk::new("héllo ", ChunkMetadata::new(0, 0, 6)),
            Chunk::new("o wörld", ChunkMetadata::new(1, 4, 7)),
        ];
        assert_eq!(reassemble(&chunks), "héllo wörld");
    }
}
