//! Chat model handle used by the LLM-backed loop components

use std::sync::Arc;

use tracing::debug;

use crate::domain::crag::BinaryScore;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::DomainError;

/// A provider bound to one model and sampling temperature
#[derive(Debug, Clone)]
pub struct ChatModel {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl ChatModel {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Free-text completion
    pub async fn complete(&self, system: Option<&str>, user: String) -> Result<String, DomainError> {
        let mut builder = LlmRequest::builder();
        if let Some(system) = system {
            builder = builder.system(system);
        }
        let request = builder.user(user).temperature(self.temperature).build();

        let response = self.provider.chat(&self.model, request).await?;
        Ok(response.content().to_string())
    }

    /// Completion constrained to the `{binary_score}` schema, parsed
    pub async fn complete_binary(&self, system: &str, user: String) -> Result<BinaryScore, DomainError> {
        let request = LlmRequest::builder()
            .system(system)
            .user(user)
            .temperature(self.temperature)
            .json_schema(BinaryScore::json_schema())
            .build();

        let response = self.provider.chat(&self.model, request).await?;
        debug!(model = %self.model, raw = response.content(), "Binary grader reply");

        BinaryScore::parse(response.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::{LlmResponseFormat, MessageRole, MockLlmProvider};

    #[tokio::test]
    async fn test_complete_binary_sends_schema() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(r#"{"binary_score": "no"}"#));
        let model = ChatModel::new(provider.clone(), "gpt-4o-mini");

        let score = model.complete_binary("grade", "doc".to_string()).await.unwrap();
        assert_eq!(score, BinaryScore::No);

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.temperature, Some(0.0));
        assert!(matches!(
            request.response_format,
            Some(LlmResponseFormat::JsonSchema { .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_is_unstructured() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("text"));
        let model = ChatModel::new(provider.clone(), "m").with_temperature(0.3);

        assert_eq!(model.complete(None, "hi".to_string()).await.unwrap(), "text");

        let request = &provider.requests()[0];
        assert_eq!(request.messages.len(), 1);
        assert!(request.response_format.is_none());
        assert_eq!(request.temperature, Some(0.3));
    }
}
