use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::azure_openai::{AzureOpenAiConfig, DEFAULT_AZURE_API_VERSION};
use super::http_client::HttpClient;
use super::openai::DEFAULT_OPENAI_BASE_URL;
use super::{AzureOpenAiProvider, OpenAiProvider};
use crate::domain::{DomainError, LlmProvider};

/// Which OpenAI-compatible service to talk to; shared by chat and embedding providers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    OpenAi {
        #[serde(default)]
        base_url: Option<String>,
    },
    AzureOpenAi {
        endpoint: String,
        #[serde(default = "default_api_version")]
        api_version: String,
    },
}

fn default_api_version() -> String {
    DEFAULT_AZURE_API_VERSION.to_string()
}

impl ProviderConfig {
    /// Environment variable consulted when no key is configured
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "OPENAI_API_KEY",
            Self::AzureOpenAi { .. } => "AZURE_OPENAI_API_KEY",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::AzureOpenAi { .. } => "azure_openai",
        }
    }
}

pub(crate) fn require_api_key(config: &ProviderConfig, api_key: &str) -> Result<(), DomainError> {
    if api_key.trim().is_empty() {
        return Err(DomainError::configuration(format!(
            "No API key for {}; set {} or configure api_key",
            config.name(),
            config.api_key_env_var()
        )));
    }
    Ok(())
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<HttpClient, DomainError> {
    HttpClient::with_timeout(timeout)
}

/// Factory for creating chat providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    pub fn create(
        config: &ProviderConfig,
        api_key: &str,
        request_timeout: Duration,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        require_api_key(config, api_key)?;
        let http_client = build_http_client(request_timeout)?;

        match config {
            ProviderConfig::OpenAi { base_url } => {
                let base_url = base_url.as_deref().unwrap_or(DEFAULT_OPENAI_BASE_URL);
                let provider = OpenAiProvider::with_base_url(http_client, api_key, base_url);
                Ok(Arc::new(provider))
            }

            ProviderConfig::AzureOpenAi {
                endpoint,
                api_version,
            } => {
                if endpoint.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "Azure OpenAI requires an endpoint",
                    ));
                }

                let azure_config =
                    AzureOpenAiConfig::new(endpoint, api_key).with_api_version(api_version);
                Ok(Arc::new(AzureOpenAiProvider::new(http_client, azure_config)))
            }
        }
    }
}
