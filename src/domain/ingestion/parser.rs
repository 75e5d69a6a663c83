//! Document parser trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

use crate::domain::DomainError;

/// Supported source formats, chosen by file extension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParserType {
    PlainText,
    Markdown,
    Pdf,
}

impl ParserType {
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::PlainText => &["txt", "text"],
            Self::Markdown => &["md", "markdown"],
            Self::Pdf => &["pdf"],
        }
    }

    /// Detect parser type from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();

        [Self::PlainText, Self::Markdown, Self::Pdf]
            .into_iter()
            .find(|parser| parser.extensions().contains(&ext.as_str()))
    }
}

/// Raw file handed to a parser
#[derive(Debug, Clone)]
pub struct ParserInput {
    pub bytes: Vec<u8>,
    /// Source identifier recorded on every chunk
    pub source: String,
}

impl ParserInput {
    pub fn new(bytes: impl Into<Vec<u8>>, source: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            source: source.into(),
        }
    }

    /// Decode the bytes as UTF-8
    pub fn text(&self) -> Result<&str, DomainError> {
        std::str::from_utf8(&self.bytes).map_err(|e| {
            DomainError::ingestion(format!("{} is not valid UTF-8: {}", self.source, e))
        })
    }
}

/// Plain text extracted from a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub content: String,
    pub source: String,
}

impl ParsedDocument {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// Trait for document parsers
#[async_trait]
pub trait DocumentParser: Send + Sync + Debug {
    fn parser_type(&self) -> ParserType;

    /// Extract plain text from the input
    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError>;
}
