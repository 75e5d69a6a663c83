//! Factory for creating parsers

use std::path::Path;
use std::sync::Arc;

use crate::domain::ingestion::{DocumentParser, ParserType};
use crate::domain::DomainError;

use super::parsers::{MarkdownParser, PdfParser, PlainTextParser};

/// Factory for creating document parsers
#[derive(Debug, Default)]
pub struct ParserFactory;

impl ParserFactory {
    /// Create a parser for the given type
    pub fn create(parser_type: ParserType) -> Arc<dyn DocumentParser> {
        match parser_type {
            ParserType::PlainText => Arc::new(PlainTextParser::new()),
            ParserType::Markdown => Arc::new(MarkdownParser::new()),
            ParserType::Pdf => Arc::new(PdfParser::new()),
        }
    }

    /// Create the parser matching a file's extension
    pub fn for_path(path: &Path) -> Result<Arc<dyn DocumentParser>, DomainError> {
        ParserType::from_path(path)
            .map(Self::create)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "Unsupported file type: {} (expected .txt, .md or .pdf)",
                    path.display()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_matches_type() {
        for parser_type in [ParserType::PlainText, ParserType::Markdown, ParserType::Pdf] {
            assert_eq!(ParserFactory::create(parser_type).parser_type(), parser_type);
        }
    }

    #[test]
    fn test_for_path() {
        let parser = ParserFactory::for_path(Path::new("docs/guide.markdown")).unwrap();
        assert_eq!(parser.parser_type(), ParserType::Markdown);

        let parser = ParserFactory::for_path(Path::new("paper.PDF")).unwrap();
        assert_eq!(parser.parser_type(), ParserType::Pdf);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = ParserFactory::for_path(Path::new("image.png")).unwrap_err();
        assert!(err.to_string().contains("image.png"));
    }
}
