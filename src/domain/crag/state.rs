//! Per-request loop state

use crate::domain::retrieval::Document;

/// Mutable state of one question, owned by the orchestrator for the request's lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState {
    question: String,
    documents: Vec<Document>,
    answer: Option<String>,
    grounded_answer: Option<String>,
    iteration: u32,
}

impl RequestState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            answer: None,
            grounded_answer: None,
            iteration: 0,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// Replace the working document set wholesale
    pub fn set_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
    }

    /// Overwrite the current answer
    pub fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = Some(answer.into());
    }

    /// Remember the current answer as the latest one that passed groundedness
    pub fn mark_grounded(&mut self) {
        if let Some(answer) = &self.answer {
            self.grounded_answer = Some(answer.clone());
        }
    }

    pub fn set_iteration(&mut self, iteration: u32) {
        debug_assert!(iteration >= self.iteration);
        self.iteration = iteration;
    }

    /// Best answer produced so far: the last grounded one, else the last one
    pub fn best_answer(&self) -> Option<&str> {
        self.grounded_answer.as_deref().or(self.answer.as_deref())
    }
}
