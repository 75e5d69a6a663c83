//! Answer generation trait

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::retrieval::Document;
use crate::domain::DomainError;

/// Synthesizes an answer from the supplied documents only.
///
/// Output length and refusals are not enforced; an "I don't know" style reply
/// is a valid answer and is graded like any other.
#[async_trait]
pub trait Generator: Send + Sync + Debug {
    async fn generate(&self, question: &str, documents: &[Document]) -> Result<String, DomainError>;
}
