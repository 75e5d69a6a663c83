//! LLM-backed binary graders
//!
//! Errors (provider failures, malformed replies) are returned as-is; the
//! orchestrator decides how to recover from them.

use async_trait::async_trait;

use super::chat_model::ChatModel;
use super::prompts;
use crate::domain::crag::{
    Decision, Groundedness, GroundednessGrader, Relevance, RelevanceGrader, Usefulness,
    UsefulnessGrader,
};
use crate::domain::retrieval::Document;
use crate::domain::DomainError;

/// One structured-output model serving all three binary graders
#[derive(Debug, Clone)]
pub struct LlmGrader {
    model: ChatModel,
}

impl LlmGrader {
    pub fn new(model: ChatModel) -> Self {
        Self { model }
    }

    async fn grade<D: Decision>(&self, system: &str, user: String) -> Result<D, DomainError> {
        let score = self.model.complete_binary(system, user).await?;
        Ok(D::from_score(score))
    }
}

#[async_trait]
impl RelevanceGrader for LlmGrader {
    async fn grade_relevance(
        &self,
        question: &str,
        document: &Document,
    ) -> Result<Relevance, DomainError> {
        self.grade(
            prompts::RELEVANCE_SYSTEM,
            prompts::relevance_user(question, document),
        )
        .await
    }
}

#[async_trait]
impl GroundednessGrader for LlmGrader {
    async fn grade_groundedness(
        &self,
        documents: &[Document],
        answer: &str,
    ) -> Result<Groundedness, DomainError> {
        self.grade(
            prompts::GROUNDEDNESS_SYSTEM,
            prompts::groundedness_user(documents, answer),
        )
        .await
    }
}

#[async_trait]
impl UsefulnessGrader for LlmGrader {
    async fn grade_usefulness(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<Usefulness, DomainError> {
        self.grade(
            prompts::USEFULNESS_SYSTEM,
            prompts::usefulness_user(question, answer),
        )
        .await
    }
}
