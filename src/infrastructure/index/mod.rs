//! Vector index storage and the retriever built on it

mod local;
mod retriever;

pub use local::{IndexEntry, IndexedChunk, LocalVectorIndex, INDEX_FILE};
pub use retriever::IndexRetriever;
