//! Plain text document parser

use async_trait::async_trait;

use crate::domain::ingestion::{DocumentParser, ParsedDocument, ParserInput, ParserType};
use crate::domain::DomainError;

/// Parser for plain text files; the content is kept verbatim
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PlainTextParser {
    fn parser_type(&self) -> ParserType {
        ParserType::PlainText
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let content = input.text()?;
        Ok(ParsedDocument::new(content, input.source.clone()))
    }
}
