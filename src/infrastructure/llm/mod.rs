//! Chat provider implementations

mod azure_openai;
mod chat_completions;
mod factory;
mod http_client;
mod openai;

pub use azure_openai::{AzureOpenAiConfig, AzureOpenAiProvider, DEFAULT_AZURE_API_VERSION};
pub use factory::{LlmProviderFactory, ProviderConfig};
pub(crate) use factory::{build_http_client, require_api_key};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
