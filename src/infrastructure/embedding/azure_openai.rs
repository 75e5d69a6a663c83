//! Azure OpenAI embedding provider implementation

use async_trait::async_trait;

use super::openai::parse_response;
use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;
use crate::infrastructure::llm::{AzureOpenAiConfig, HttpClientTrait};

/// Azure OpenAI embedding provider; the request model is the deployment name
#[derive(Debug)]
pub struct AzureOpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    config: AzureOpenAiConfig,
}

impl<C: HttpClientTrait> AzureOpenAiEmbeddingProvider<C> {
    pub fn new(client: C, config: AzureOpenAiConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for AzureOpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let url = self.config.deployment_url(request.model(), "embeddings");
        let body = serde_json::json!({ "input": request.inputs() });
        let headers = vec![
            ("api-key", self.config.api_key.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self.client.post_json(&url, headers, &body).await?;

        parse_response(self.provider_name(), response)
    }

    fn provider_name(&self) -> &'static str {
        "azure_openai"
    }
}
