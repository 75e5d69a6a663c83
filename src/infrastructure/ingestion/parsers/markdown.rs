//! Markdown document parser

use async_trait::async_trait;
use pulldown_cmark::{Event, Parser, Tag};

use crate::domain::ingestion::{DocumentParser, ParsedDocument, ParserInput, ParserType};
use crate::domain::DomainError;

/// Parser for Markdown files, rendered down to plain text
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }

    /// Headings, paragraphs, list items and code blocks each end up on their
    /// own lines, separated by blank lines so the splitter sees the structure
    fn to_text(markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak => text.push(' '),
                Event::HardBreak => text.push('\n'),
                Event::Start(Tag::Item) => {
                    end_line(&mut text);
                    text.push_str("- ");
                }
                Event::End(Tag::Item) => end_line(&mut text),
                Event::Start(Tag::Heading(..))
                | Event::Start(Tag::Paragraph)
                | Event::Start(Tag::CodeBlock(_)) => end_block(&mut text),
                Event::End(Tag::Heading(..))
                | Event::End(Tag::Paragraph)
                | Event::End(Tag::CodeBlock(_)) => end_line(&mut text),
                _ => {}
            }
        }

        text.lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

fn end_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn end_block(text: &mut String) {
    end_line(text);
    if !text.is_empty() && !text.ends_with("\n\n") {
        text.push('\n');
    }
}

#[async_trait]
impl DocumentParser for MarkdownParser {
    fn parser_type(&self) -> ParserType {
        ParserType::Markdown
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let content = Self::to_text(input.text()?);
        Ok(ParsedDocument::new(content, input.source.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(markdown: &str) -> String {
        MarkdownParser::new()
            .parse(ParserInput::new(markdown.as_bytes().to_vec(), "doc.md"))
            .await
            .unwrap()
            .content
    }

    #[tokio::test]
    async fn test_strips_markup() {
        let text = parse("# Title\n\nSome **bold** and `code` text.").await;
        assert_eq!(text, "Title\n\nSome bold and code text.");
    }

    #[tokio::test]
    async fn test_paragraphs_are_separated_by_blank_lines() {
        let text = parse("First paragraph\ncontinues here.\n\nSecond paragraph.").await;
        assert_eq!(text, "First paragraph continues here.\n\nSecond paragraph.");
    }

    #[tokio::test]
    async fn test_list_items_on_own_lines() {
        let text = parse("Steps:\n\n* one\n* two\n").await;
        assert!(text.contains("- one\n- two"));
    }

    #[tokio::test]
    async fn test_code_block_content_is_kept() {
        let text = parse("Run:\n\n```\ncargo run\n```\n").await;
        assert!(text.contains("cargo run"));
    }

    #[tokio::test]
    async fn test_source_is_recorded() {
        let parsed = MarkdownParser::new()
            .parse(ParserInput::new(b"text".to_vec(), "notes/readme.md"))
            .await
            .unwrap();
        assert_eq!(parsed.source, "notes/readme.md");
    }
}
