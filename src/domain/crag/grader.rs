//! Binary grader traits

use async_trait::async_trait;
use std::fmt::Debug;

use super::decision::{Groundedness, Relevance, Usefulness};
use crate::domain::retrieval::Document;
use crate::domain::DomainError;

/// Judges a single document against the question, independently of the others
#[async_trait]
pub trait RelevanceGrader: Send + Sync + Debug {
    async fn grade_relevance(
        &self,
        question: &str,
        document: &Document,
    ) -> Result<Relevance, DomainError>;
}

/// Judges whether an answer is supported by the documents it was generated from
#[async_trait]
pub trait GroundednessGrader: Send + Sync + Debug {
    async fn grade_groundedness(
        &self,
        documents: &[Document],
        answer: &str,
    ) -> Result<Groundedness, DomainError>;
}

/// Judges whether an answer resolves the question
#[async_trait]
pub trait UsefulnessGrader: Send + Sync + Debug {
    async fn grade_usefulness(&self, question: &str, answer: &str)
    -> Result<Usefulness, DomainError>;
}
