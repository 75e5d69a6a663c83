//! Ingestion pipeline service
//!
//! Reads source files, extracts their text, splits it into offset-tagged
//! chunks, embeds the chunks in batches and writes them to the local index.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::ingestion::{Chunk, ChunkingConfig, ChunkingStrategy, ParserInput};
use crate::domain::retrieval::VectorIndex;
use crate::domain::DomainError;
use crate::infrastructure::index::{IndexedChunk, LocalVectorIndex};

use super::chunkers::RecursiveChunker;
use super::factory::ParserFactory;

pub const DEFAULT_BATCH_SIZE: usize = 64;

/// What happened to one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub chunks: usize,
    /// Entries from an earlier ingestion of the same source that were dropped
    pub replaced: usize,
}

/// Result of one ingestion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestionReport {
    pub sources: Vec<SourceReport>,
    /// Index totals after the run, including sources ingested earlier
    pub index_sources: usize,
    pub index_chunks: usize,
}

impl IngestionReport {
    pub fn total_chunks(&self) -> usize {
        self.sources.iter().map(|s| s.chunks).sum()
    }
}

/// Ingestion pipeline for building the local vector index
#[derive(Debug)]
pub struct IngestionPipeline {
    index: Arc<LocalVectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    embedding_model: String,
    chunker: Arc<dyn ChunkingStrategy>,
    chunking: ChunkingConfig,
    batch_size: usize,
}

impl IngestionPipeline {
    pub fn new(
        index: Arc<LocalVectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        embedding_model: impl Into<String>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            embedding_model: embedding_model.into(),
            chunker: Arc::new(RecursiveChunker::new()),
            chunking,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_chunker(mut self, chunker: Arc<dyn ChunkingStrategy>) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Ingest every file and persist the index.
    ///
    /// All paths are checked before any work starts; a missing or unsupported
    /// file aborts the run and leaves the index on disk untouched.
    #[instrument(skip(self, paths), fields(files = paths.len()))]
    pub async fn ingest_paths(&self, paths: &[PathBuf]) -> Result<IngestionReport, DomainError> {
        self.chunking.validate()?;

        for path in paths {
            ParserFactory::for_path(path)?;

            let exists = tokio::fs::try_exists(path).await.unwrap_or(false);
            if !exists {
                return Err(DomainError::ingestion(format!(
                    "File not found: {}",
                    path.display()
                )));
            }
        }

        let mut report = IngestionReport::default();
        for path in paths {
            report.sources.push(self.ingest_file(path).await?);
        }

        self.index.save().await?;
        report.index_sources = self.index.sources().await.len();
        report.index_chunks = self.index.len().await;

        info!(
            sources = report.sources.len(),
            chunks = report.total_chunks(),
            index_chunks = report.index_chunks,
            path = %self.index.path().display(),
            "Ingestion complete"
        );

        Ok(report)
    }

    async fn ingest_file(&self, path: &Path) -> Result<SourceReport, DomainError> {
        let parser = ParserFactory::for_path(path)?;
        let source = path.display().to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::ingestion(format!("Failed to read {}: {}", source, e))
        })?;

        let parsed = parser.parse(ParserInput::new(bytes, source.clone())).await?;
        let chunks = self.chunker.chunk(&parsed.content, &self.chunking)?;

        debug!(
            source = %source,
            chunker = self.chunker.name(),
            chunks = chunks.len(),
            "Split document"
        );

        let vectors = self.embed(&chunks).await?;

        let indexed = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedChunk {
                start_offset: chunk.start_offset(),
                content: chunk.content,
                vector,
            })
            .collect::<Vec<_>>();

        let count = indexed.len();
        let replaced = self.index.replace_source(&source, indexed).await;

        info!(source = %source, chunks = count, replaced, "Ingested source");

        Ok(SourceReport {
            source,
            chunks: count,
            replaced,
        })
    }

    async fn embed(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut vectors = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(self.batch_size) {
            let inputs = batch.iter().map(|c| c.content.clone()).collect();
            let request = EmbeddingRequest::new(self.embedding_model.clone(), inputs);

            let response = self.embedder.embed(request).await?;
            vectors.extend(response.into_vectors(batch.len())?);
        }

        Ok(vectors)
    }
}
