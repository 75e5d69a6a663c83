//! Persistent local vector index
//!
//! The index is a directory holding a single `index.json`. All entries are
//! loaded into memory; queries embed the text and rank by cosine similarity.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::embedding::{cosine_similarity, EmbeddingProvider, EmbeddingRequest};
use crate::domain::retrieval::{Document, VectorIndex};
use crate::domain::DomainError;

pub const INDEX_FILE: &str = "index.json";

/// One embedded chunk as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub content: String,
    pub source: String,
    pub start_offset: usize,
    pub vector: Vec<f32>,
}

/// A chunk ready to be written to the index
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub content: String,
    pub start_offset: usize,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexFile {
    embedding_model: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl IndexFile {
    fn empty(embedding_model: &str) -> Self {
        let now = Utc::now();
        Self {
            embedding_model: embedding_model.to_string(),
            created_at: now,
            updated_at: now,
            entries: Vec::new(),
        }
    }
}

/// On-disk vector index shared by ingestion (writer) and retrieval (reader)
#[derive(Debug)]
pub struct LocalVectorIndex {
    dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    data: RwLock<IndexFile>,
}

impl LocalVectorIndex {
    /// Open the index at `dir`, starting empty if it does not exist yet
    pub async fn open(
        dir: impl Into<PathBuf>,
        embedder: Arc<dyn EmbeddingProvider>,
        embedding_model: &str,
    ) -> Result<Self, DomainError> {
        let dir = dir.into();
        let data = match read_index_file(&dir).await? {
            Some(data) => data,
            None => IndexFile::empty(embedding_model),
        };

        Self::from_data(dir, embedder, embedding_model, data)
    }

    /// Open an index that must already exist
    pub async fn load(
        dir: impl Into<PathBuf>,
        embedder: Arc<dyn EmbeddingProvider>,
        embedding_model: &str,
    ) -> Result<Self, DomainError> {
        let dir = dir.into();
        let data = read_index_file(&dir).await?.ok_or_else(|| {
            DomainError::index(format!(
                "No index found at {}; run `ingest` first",
                dir.display()
            ))
        })?;

        Self::from_data(dir, embedder, embedding_model, data)
    }

    fn from_data(
        dir: PathBuf,
        embedder: Arc<dyn EmbeddingProvider>,
        embedding_model: &str,
        data: IndexFile,
    ) -> Result<Self, DomainError> {
        if data.embedding_model != embedding_model {
            return Err(DomainError::index(format!(
                "Index at {} was built with embedding model '{}', configured model is '{}'",
                dir.display(),
                data.embedding_model,
                embedding_model
            )));
        }

        info!(
            path = %dir.display(),
            entries = data.entries.len(),
            "Opened vector index"
        );

        Ok(Self {
            dir,
            embedder,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Replace every entry of `source` with `chunks`; returns the number removed
    pub async fn replace_source(&self, source: &str, chunks: Vec<IndexedChunk>) -> usize {
        let mut data = self.data.write().await;
        let before = data.entries.len();
        data.entries.retain(|entry| entry.source != source);
        let removed = before - data.entries.len();

        data.entries
            .extend(chunks.into_iter().map(|chunk| IndexEntry {
                id: Uuid::new_v4().to_string(),
                content: chunk.content,
                source: source.to_string(),
                start_offset: chunk.start_offset,
                vector: chunk.vector,
            }));
        data.updated_at = Utc::now();

        debug!(source, removed, total = data.entries.len(), "Replaced source entries");
        removed
    }

    /// Distinct sources with their chunk counts, in first-insertion order
    pub async fn sources(&self) -> Vec<(String, usize)> {
        let data = self.data.read().await;
        let mut sources: Vec<(String, usize)> = Vec::new();

        for entry in &data.entries {
            match sources.iter_mut().find(|(source, _)| *source == entry.source) {
                Some((_, count)) => *count += 1,
                None => sources.push((entry.source.clone(), 1)),
            }
        }

        sources
    }

    /// Persist to `index.json`, writing a temporary file first and renaming it
    pub async fn save(&self) -> Result<(), DomainError> {
        let data = self.data.read().await;
        let json = serde_json::to_vec(&*data)
            .map_err(|e| DomainError::index(format!("Failed to serialize index: {}", e)))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            DomainError::index(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let target = self.dir.join(INDEX_FILE);
        let tmp = self.dir.join(format!("{}.tmp", INDEX_FILE));

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| DomainError::index(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &target).await.map_err(|e| {
            DomainError::index(format!("Failed to move index into place: {}", e))
        })?;

        info!(path = %target.display(), entries = data.entries.len(), "Saved vector index");
        Ok(())
    }

    async fn embed_query(&self, text: &str, model: String) -> Result<Vec<f32>, DomainError> {
        let response = self
            .embedder
            .embed(EmbeddingRequest::single(model, text))
            .await?;

        response
            .into_vectors(1)?
            .pop()
            .ok_or_else(|| DomainError::internal("Embedding provider returned no vector"))
    }
}

async fn read_index_file(dir: &Path) -> Result<Option<IndexFile>, DomainError> {
    let path = dir.join(INDEX_FILE);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DomainError::index(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| DomainError::index(format!("Corrupt index {}: {}", path.display(), e)))
}

#[async_trait]
impl VectorIndex for LocalVectorIndex {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Document>, DomainError> {
        let model = {
            let data = self.data.read().await;
            if data.entries.is_empty() || k == 0 {
                return Ok(Vec::new());
            }
            data.embedding_model.clone()
        };

        let query_vector = self.embed_query(text, model).await?;
        let data = self.data.read().await;

        let mut scored: Vec<(f32, &IndexEntry)> = data
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_vector, &entry.vector), entry))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| {
                Document::new(entry.content.clone())
                    .with_source_offset(entry.start_offset)
                    .with_source(entry.source.clone())
            })
            .collect())
    }

    async fn len(&self) -> usize {
        self.data.read().await.entries.len()
    }
}
