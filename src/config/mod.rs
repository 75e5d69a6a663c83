//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CragSettings, EmbeddingSettings, IndexSettings, LlmSettings, LogFormat,
    LoggingConfig, ProviderKind,
};
