//! LLM-backed loop collaborators and the orchestrator that drives them

mod chat_model;
mod fail_safe;
mod llm_generator;
mod llm_grader;
mod llm_rewriter;
mod orchestrator;
pub mod prompts;
mod relevance_filter;

pub use chat_model::ChatModel;
pub use fail_safe::grade_or_negative;
pub use llm_generator::LlmGenerator;
pub use llm_grader::LlmGrader;
pub use llm_rewriter::LlmQueryRewriter;
pub use orchestrator::{CragCollaborators, Orchestrator};
pub use relevance_filter::filter_relevant;
