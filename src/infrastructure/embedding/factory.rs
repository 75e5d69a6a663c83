use std::sync::Arc;
use std::time::Duration;

use super::{AzureOpenAiEmbeddingProvider, OpenAiEmbeddingProvider};
use crate::domain::{DomainError, EmbeddingProvider};
use crate::infrastructure::llm::{
    build_http_client, require_api_key, AzureOpenAiConfig, ProviderConfig,
};

/// Factory for creating embedding providers
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    pub fn create(
        config: &ProviderConfig,
        api_key: &str,
        request_timeout: Duration,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        require_api_key(config, api_key)?;
        let http_client = build_http_client(request_timeout)?;

        match config {
            ProviderConfig::OpenAi { base_url } => {
                let provider = match base_url {
                    Some(base_url) => {
                        OpenAiEmbeddingProvider::with_base_url(http_client, api_key, base_url)
                    }
                    None => OpenAiEmbeddingProvider::new(http_client, api_key),
                };
                Ok(Arc::new(provider))
            }

            ProviderConfig::AzureOpenAi {
                endpoint,
                api_version,
            } => {
                if endpoint.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "Azure OpenAI embeddings require an endpoint",
                    ));
                }

                let azure_config =
                    AzureOpenAiConfig::new(endpoint, api_key).with_api_version(api_version);
                Ok(Arc::new(AzureOpenAiEmbeddingProvider::new(
                    http_client,
                    azure_config,
                )))
            }
        }
    }
}
