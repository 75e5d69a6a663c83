//! Agentic RAG
//!
//! Self-correcting retrieval-augmented question answering over a local
//! document index:
//! - Relevance filtering of retrieved chunks
//! - Groundedness and usefulness checks on generated answers
//! - Question rewriting with a bounded number of retries
//! - Ingestion of text, Markdown and PDF files into the index

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::{DomainError, EmbeddingProvider, VectorIndex};
use infrastructure::{
    crag::{ChatModel, CragCollaborators, LlmGenerator, LlmGrader, LlmQueryRewriter, Orchestrator},
    embedding::EmbeddingProviderFactory,
    index::{IndexRetriever, LocalVectorIndex},
    ingestion::IngestionPipeline,
    llm::LlmProviderFactory,
};
use tracing::{info, warn};

fn create_embedder(config: &AppConfig) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
    let embedding = &config.embedding;

    EmbeddingProviderFactory::create(
        &embedding.provider_config(),
        &embedding.api_key(),
        embedding.request_timeout(),
    )
}

/// Wire the loop against the configured chat model and the existing index
pub async fn create_orchestrator(config: &AppConfig) -> Result<Orchestrator, DomainError> {
    let llm = &config.llm;
    let provider = LlmProviderFactory::create(
        &llm.provider_config(),
        &llm.api_key(),
        llm.request_timeout(),
    )?;
    let embedder = create_embedder(config)?;

    let index = LocalVectorIndex::load(&config.index.path, embedder, &config.embedding.model).await?;
    let chunks = index.len().await;
    if chunks == 0 {
        warn!(
            index = %config.index.path.display(),
            "Index is empty; questions will be rewritten until the iteration bound"
        );
    }
    let retriever = Arc::new(IndexRetriever::new(Arc::new(index), config.index.top_k));

    let model = ChatModel::new(provider, &llm.model).with_temperature(llm.temperature);
    let grader = Arc::new(LlmGrader::new(model.clone()));

    let collaborators = CragCollaborators {
        retriever,
        relevance: grader.clone(),
        generator: Arc::new(LlmGenerator::new(model.clone())),
        groundedness: grader.clone(),
        usefulness: grader,
        rewriter: Arc::new(LlmQueryRewriter::new(model)),
    };

    info!(
        provider = llm.provider_config().name(),
        model = %llm.model,
        index = %config.index.path.display(),
        chunks,
        "Orchestrator ready"
    );

    Orchestrator::new(collaborators, config.crag.to_crag_config())
}

/// Wire the ingestion pipeline, creating the index directory's contents on first save
pub async fn create_ingestion_pipeline(
    config: &AppConfig,
) -> Result<IngestionPipeline, DomainError> {
    let embedder = create_embedder(config)?;
    let index = Arc::new(
        LocalVectorIndex::open(&config.index.path, embedder.clone(), &config.embedding.model)
            .await?,
    );

    Ok(
        IngestionPipeline::new(index, embedder, &config.embedding.model, config.ingestion)
            .with_batch_size(config.embedding.batch_size),
    )
}
