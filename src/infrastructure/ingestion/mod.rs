//! Document ingestion infrastructure
//!
//! This module provides implementations for document parsing, chunking,
//! and the ingestion pipeline.

pub mod chunkers;
pub mod factory;
pub mod parsers;
pub mod pipeline;

pub use chunkers::RecursiveChunker;
pub use factory::ParserFactory;
pub use parsers::{MarkdownParser, PdfParser, PlainTextParser};
pub use pipeline::{IngestionPipeline, IngestionReport, SourceReport, DEFAULT_BATCH_SIZE};
