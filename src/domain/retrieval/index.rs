//! Vector index trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::Document;
use crate::domain::DomainError;

/// Read-only similarity search over a persisted index
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Return up to `k` documents ordered most-similar-first
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Document>, DomainError>;

    /// Number of indexed chunks
    async fn len(&self) -> usize;
}
