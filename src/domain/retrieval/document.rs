//! Retrieved document entity

use serde::{Deserialize, Serialize};

/// Unit of retrieved text; immutable once produced by a retriever
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_offset: None,
            source: None,
        }
    }

    /// Character offset of this chunk within its source document
    pub fn with_source_offset(mut self, offset: usize) -> Self {
        self.source_offset = Some(offset);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_offset(&self) -> Option<usize> {
        self.source_offset
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Join document contents into a single context block, blank-line separated
pub fn join_contents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(Document::content)
        .collect::<Vec<_>>()
        .join("\n\n")
}
