//! Self-correcting retrieval loop: decisions, collaborator traits and the state machine

mod config;
mod decision;
mod generator;
mod grader;
mod machine;
mod outcome;
mod rewriter;
mod state;

pub use config::CragConfig;
pub use decision::{BinaryScore, Decision, Groundedness, Relevance, Usefulness};
pub use generator::Generator;
pub use grader::{GroundednessGrader, RelevanceGrader, UsefulnessGrader};
pub use machine::{advance, is_reentry, transition, Advance, LoopState, StepOutcome};
pub use outcome::{CragError, CragOutcome, CragRun, CragRunSummary};
pub use rewriter::QueryRewriter;
pub use state::RequestState;

#[cfg(test)]
pub use generator::mock::MockGenerator;
#[cfg(test)]
pub use grader::mock::{MockGroundednessGrader, MockRelevanceGrader, MockUsefulnessGrader};
#[cfg(test)]
pub use rewriter::mock::MockQueryRewriter;
