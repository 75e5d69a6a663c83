//! Embedding provider implementations

mod azure_openai;
mod factory;
mod openai;

pub use azure_openai::AzureOpenAiEmbeddingProvider;
pub use factory::EmbeddingProviderFactory;
pub use openai::{OpenAiEmbeddingProvider, DEFAULT_EMBEDDING_MODEL};
