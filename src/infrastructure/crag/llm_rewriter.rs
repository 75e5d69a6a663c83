//! LLM-backed query rewriter

use async_trait::async_trait;

use super::chat_model::ChatModel;
use super::prompts;
use crate::domain::crag::QueryRewriter;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct LlmQueryRewriter {
    model: ChatModel,
}

impl LlmQueryRewriter {
    pub fn new(model: ChatModel) -> Self {
        Self { model }
    }
}

#[async_trait]
impl QueryRewriter for LlmQueryRewriter {
    async fn rewrite(&self, question: &str) -> Result<String, DomainError> {
        let rewritten = self
            .model
            .complete(Some(prompts::REWRITE_SYSTEM), prompts::rewrite_user(question))
            .await?;

        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            return Err(DomainError::provider(
                "rewriter",
                "Model returned an empty question",
            ));
        }

        Ok(rewritten.to_string())
    }
}
