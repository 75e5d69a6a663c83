//! Document ingestion domain types and traits
//!
//! This module provides:
//! - `DocumentParser` trait for extracting text from source files
//! - `ChunkingStrategy` trait for splitting text into offset-tagged chunks

pub mod chunker;
pub mod parser;

pub use chunker::{reassemble, Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
pub use parser::{DocumentParser, ParsedDocument, ParserInput, ParserType};
