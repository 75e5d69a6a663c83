//! Recursive character chunking strategy

use std::collections::VecDeque;

use crate::domain::ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

/// Paragraphs, then lines, then words, then single characters
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits on the coarsest separator present, recursing into pieces that are
/// still too long, then merges adjacent pieces back up to the chunk size with
/// the configured overlap.
///
/// Separators stay attached to the piece that follows them and nothing is
/// trimmed, so every chunk is a verbatim slice of the source.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    separators: Vec<&'static str>,
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new()
    }
}

/// A contiguous region of the source, tracked in both bytes and characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    byte_start: usize,
    byte_end: usize,
    char_start: usize,
    chars: usize,
}

impl Span {
    fn covering(first: &Span, last: &Span) -> Span {
        Span {
            byte_start: first.byte_start,
            byte_end: last.byte_end,
            char_start: first.char_start,
            chars: last.char_start + last.chars - first.char_start,
        }
    }
}

impl RecursiveChunker {
    pub fn new() -> Self {
        Self {
            separators: DEFAULT_SEPARATORS.to_vec(),
        }
    }

    /// Use custom separators, coarsest first. An empty separator is appended
    /// when missing so any text can always be split.
    pub fn with_separators(mut self, separators: Vec<&'static str>) -> Self {
        self.separators = separators;
        if !self.separators.contains(&"") {
            self.separators.push("");
        }
        self
    }

    /// Cut `span` before every occurrence of `separator`
    fn pieces(source: &str, span: Span, separator: &str) -> Vec<Span> {
        let text = &source[span.byte_start..span.byte_end];

        let mut cuts: Vec<usize> = if separator.is_empty() {
            text.char_indices().map(|(i, _)| i).collect()
        } else {
            text.match_indices(separator).map(|(i, _)| i).collect()
        };
        cuts.push(text.len());

        let mut pieces = Vec::with_capacity(cuts.len());
        let mut prev = 0;
        let mut char_start = span.char_start;

        for cut in cuts {
            if cut <= prev {
                continue;
            }

            let chars = text[prev..cut].chars().count();
            pieces.push(Span {
                byte_start: span.byte_start + prev,
                byte_end: span.byte_start + cut,
                char_start,
                chars,
            });
            char_start += chars;
            prev = cut;
        }

        pieces
    }

    fn split(
        &self,
        source: &str,
        span: Span,
        separators: &[&'static str],
        config: &ChunkingConfig,
        chunks: &mut Vec<Span>,
    ) {
        let text = &source[span.byte_start..span.byte_end];

        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let mut fitting = Vec::new();

        for piece in Self::pieces(source, span, separator) {
            if piece.chars <= config.chunk_size {
                fitting.push(piece);
                continue;
            }

            Self::merge(&fitting, config, chunks);
            fitting.clear();

            if finer.is_empty() {
                chunks.push(piece);
            } else {
                self.split(source, piece, finer, config, chunks);
            }
        }

        Self::merge(&fitting, config, chunks);
    }

    /// Greedily pack pieces into chunks, carrying up to `chunk_overlap`
    /// characters of trailing pieces into the next chunk
    fn merge(pieces: &[Span], config: &ChunkingConfig, chunks: &mut Vec<Span>) {
        let mut window: VecDeque<Span> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            if total + piece.chars > config.chunk_size {
                if let (Some(first), Some(last)) = (window.front(), window.back()) {
                    chunks.push(Span::covering(first, last));
                }

                // Always drops at least one piece, so chunk starts strictly increase
                while total > config.chunk_overlap
                    || (total > 0 && total + piece.chars > config.chunk_size)
                {
                    match window.pop_front() {
                        Some(dropped) => total -= dropped.chars,
                        None => break,
                    }
                }
            }

            window.push_back(*piece);
            total += piece.chars;
        }

        if let (Some(first), Some(last)) = (window.front(), window.back()) {
            chunks.push(Span::covering(first, last));
        }
    }
}

impl ChunkingStrategy for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        if content.is_empty() {
            return Ok(vec![]);
        }

        let whole = Span {
            byte_start: 0,
            byte_end: content.len(),
            char_start: 0,
            chars: content.chars().count(),
        };

        let mut spans = Vec::new();
        self.split(content, whole, &self.separators, config, &mut spans);

        Ok(spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| {
                Chunk::new(
                    &content[span.byte_start..span.byte_end],
                    ChunkMetadata::new(index, span.char_start, span.chars),
                )
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}
