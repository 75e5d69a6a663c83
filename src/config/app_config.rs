use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::crag::CragConfig;
use crate::domain::ingestion::ChunkingConfig;
use crate::domain::DomainError;
use crate::infrastructure::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::infrastructure::ingestion::DEFAULT_BATCH_SIZE;
use crate::infrastructure::llm::{ProviderConfig, DEFAULT_AZURE_API_VERSION};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub ingestion: ChunkingConfig,
    pub crag: CragSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Hosted OpenAI or an Azure OpenAI resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProviderKind {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "azure_openai", alias = "azure")]
    AzureOpenAi,
}

/// Chat model used by the graders, the generator and the rewriter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    /// Model name, or deployment name on Azure
    pub model: String,
    /// Azure resource endpoint, or a custom OpenAI-compatible base URL
    pub endpoint: Option<String>,
    pub api_version: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: ProviderKind,
    pub model: String,
    pub endpoint: Option<String>,
    pub api_version: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    /// Chunks embedded per request during ingestion
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub path: PathBuf,
    /// Documents returned per retrieval
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CragSettings {
    pub max_iterations: u32,
    pub step_timeout_secs: u64,
    /// Relevance calls in flight at once; 1 grades sequentially
    pub grading_concurrency: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: "gpt-4o-mini".to_string(),
            endpoint: None,
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            api_key: None,
            temperature: 0.0,
            request_timeout_secs: 60,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            endpoint: None,
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            api_key: None,
            request_timeout_secs: 60,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./vector_index"),
            top_k: 4,
        }
    }
}

impl Default for CragSettings {
    fn default() -> Self {
        let defaults = CragConfig::default();
        Self {
            max_iterations: defaults.max_iterations,
            step_timeout_secs: defaults.step_timeout.as_secs(),
            grading_concurrency: defaults.grading_concurrency,
        }
    }
}

fn provider_config(
    kind: ProviderKind,
    endpoint: &Option<String>,
    api_version: &str,
) -> ProviderConfig {
    match kind {
        ProviderKind::OpenAi => ProviderConfig::OpenAi {
            base_url: endpoint.clone(),
        },
        ProviderKind::AzureOpenAi => ProviderConfig::AzureOpenAi {
            endpoint: endpoint.clone().unwrap_or_default(),
            api_version: api_version.to_string(),
        },
    }
}

/// Configured key, else the provider's environment variable
fn resolve_api_key(
    configured: &Option<String>,
    provider: &ProviderConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    configured
        .clone()
        .filter(|key| !key.trim().is_empty())
        .or_else(|| lookup(provider.api_key_env_var()))
        .unwrap_or_default()
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl LlmSettings {
    pub fn provider_config(&self) -> ProviderConfig {
        provider_config(self.provider, &self.endpoint, &self.api_version)
    }

    /// Empty when neither the config nor the environment holds a key
    pub fn api_key(&self) -> String {
        resolve_api_key(&self.api_key, &self.provider_config(), env_lookup)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl EmbeddingSettings {
    pub fn provider_config(&self) -> ProviderConfig {
        provider_config(self.provider, &self.endpoint, &self.api_version)
    }

    pub fn api_key(&self) -> String {
        resolve_api_key(&self.api_key, &self.provider_config(), env_lookup)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl CragSettings {
    pub fn to_crag_config(&self) -> CragConfig {
        CragConfig::new()
            .with_max_iterations(self.max_iterations)
            .with_step_timeout(Duration::from_secs(self.step_timeout_secs))
            .with_grading_concurrency(self.grading_concurrency)
    }
}

impl AppConfig {
    /// Load configuration from, lowest priority first: built-in defaults,
    /// `config/default`, `config/local`, the optional explicit file, and
    /// `APP__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.crag.to_crag_config().validate()?;

        self.ingestion
            .validate()
            .map_err(|e| DomainError::configuration(format!("ingestion: {}", e)))?;

        if self.embedding.batch_size == 0 {
            return Err(DomainError::configuration(
                "embedding.batch_size must be greater than 0",
            ));
        }

        if self.index.top_k == 0 {
            return Err(DomainError::configuration(
                "index.top_k must be greater than 0",
            ));
        }

        for (section, timeout) in [
            ("llm", self.llm.request_timeout_secs),
            ("embedding", self.embedding.request_timeout_secs),
        ] {
            if timeout == 0 {
                return Err(DomainError::configuration(format!(
                    "{}.request_timeout_secs must be greater than 0",
                    section
                )));
            }
        }

        Ok(())
    }
}
