//! PDF document parser

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ingestion::{DocumentParser, ParsedDocument, ParserInput, ParserType};
use crate::domain::DomainError;

/// Extracts the text layer of a PDF with `pdf-extract`
#[derive(Debug, Clone, Default)]
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PdfParser {
    fn parser_type(&self) -> ParserType {
        ParserType::Pdf
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let ParserInput { bytes, source } = input;

        // Extraction is CPU-bound and synchronous
        let extracted =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

        let content = match extracted {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                return Err(DomainError::ingestion(format!(
                    "Failed to read PDF {}: {}",
                    source, e
                )));
            }
            Err(e) => {
                return Err(DomainError::ingestion(format!(
                    "PDF extraction for {} aborted: {}",
                    source, e
                )));
            }
        };

        debug!(source = %source, chars = content.chars().count(), "Extracted PDF text");

        Ok(ParsedDocument::new(content, source))
    }
}
