//! Loop errors and terminal results

use serde::Serialize;
use thiserror::Error;

use super::machine::LoopState;
use crate::domain::DomainError;

/// Failures of individual loop steps
#[derive(Debug, Error)]
pub enum CragError {
    #[error("Retrieval failed: {0}")]
    Retrieval(DomainError),

    #[error("Grading failed: {0}")]
    Grading(DomainError),

    #[error("Generation failed: {0}")]
    Generation(DomainError),

    #[error("Query rewrite failed: {0}")]
    Rewrite(DomainError),

    #[error("Iteration bound exceeded after {iterations} of {max_iterations} iterations")]
    IterationBoundExceeded { iterations: u32, max_iterations: u32 },

    #[error("No transition from {from} on {outcome}")]
    InvalidTransition { from: LoopState, outcome: String },
}

impl CragError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Retrieval(_) => "RETRIEVAL_ERROR",
            Self::Grading(_) => "GRADING_ERROR",
            Self::Generation(_) => "GENERATION_ERROR",
            Self::Rewrite(_) => "REWRITE_ERROR",
            Self::IterationBoundExceeded { .. } => "ITERATION_BOUND_EXCEEDED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}

/// Terminal result of one question
#[derive(Debug)]
pub enum CragOutcome {
    /// A grounded, useful answer
    Done { answer: String },
    /// The loop gave up; `best_answer` is unverified when present
    Failed {
        reason: CragError,
        best_answer: Option<String>,
    },
}

impl CragOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    /// Verified answer, only for `Done`
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Done { answer } => Some(answer),
            Self::Failed { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Done { .. } => "done",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Everything a caller may want to know about one run
#[derive(Debug)]
pub struct CragRun {
    pub outcome: CragOutcome,
    /// Every state entered, in order, starting with the initial one
    pub trace: Vec<LoopState>,
    /// Re-entries consumed
    pub iterations: u32,
    /// Question as last rewritten
    pub final_question: String,
}

/// Serializable view of a run, for structured output
#[derive(Debug, Serialize)]
pub struct CragRunSummary<'a> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_answer: Option<&'a str>,
    pub trace: &'a [LoopState],
    pub iterations: u32,
    pub final_question: &'a str,
}

impl CragRun {
    pub fn summary(&self) -> CragRunSummary<'_> {
        let (answer, failure, best_answer) = match &self.outcome {
            CragOutcome::Done { answer } => (Some(answer.as_str()), None, None),
            CragOutcome::Failed {
                reason,
                best_answer,
            } => (None, Some(reason), best_answer.as_deref()),
        };

        CragRunSummary {
            status: self.outcome.label(),
            answer,
            failure_code: failure.map(CragError::code),
            failure_reason: failure.map(ToString::to_string),
            best_answer,
            trace: &self.trace,
            iterations: self.iterations,
            final_question: &self.final_question,
        }
    }
}
