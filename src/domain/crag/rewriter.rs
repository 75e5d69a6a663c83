//! Query rewriting trait

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Reformulates a question for retrieval while preserving its intent.
///
/// Depends on the current question only; successive rewrites need not converge.
#[async_trait]
pub trait QueryRewriter: Send + Sync + Debug {
    async fn rewrite(&self, question: &str) -> Result<String, DomainError>;
}
