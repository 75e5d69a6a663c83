//! Domain layer - Core entities, collaborator traits and the loop state machine

pub mod crag;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod llm;
pub mod retrieval;

pub use crag::{
    BinaryScore, CragConfig, CragError, CragOutcome, CragRun, Decision, Generator, Groundedness,
    GroundednessGrader, LoopState, QueryRewriter, Relevance, RelevanceGrader, RequestState,
    StepOutcome, Usefulness, UsefulnessGrader,
};
pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::DomainError;
pub use ingestion::{Chunk, ChunkingConfig, ChunkingStrategy, DocumentParser, ParserType};
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
pub use retrieval::{Document, Retriever, VectorIndex};
