//! LLM-backed answer generator

use async_trait::async_trait;
use tracing::debug;

use super::chat_model::ChatModel;
use super::prompts;
use crate::domain::crag::Generator;
use crate::domain::retrieval::Document;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct LlmGenerator {
    model: ChatModel,
}

impl LlmGenerator {
    pub fn new(model: ChatModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, question: &str, documents: &[Document]) -> Result<String, DomainError> {
        debug!(documents = documents.len(), model = self.model.model(), "Generating answer");

        self.model
            .complete(None, prompts::generation_user(question, documents))
            .await
    }
}
