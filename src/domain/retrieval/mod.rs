//! Retrieval domain: documents, retrievers and the vector index they sit on

mod document;
mod index;
mod retriever;

pub use document::{join_contents, Document};
pub use index::VectorIndex;
pub use retriever::Retriever;

#[cfg(test)]
pub use index::mock::MockVectorIndex;
#[cfg(test)]
pub use retriever::mock::MockRetriever;
