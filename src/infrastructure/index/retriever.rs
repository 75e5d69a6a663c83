//! Retriever backed by a vector index

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::retrieval::{Document, Retriever, VectorIndex};
use crate::domain::DomainError;

/// Top-k similarity retrieval over a `VectorIndex`
#[derive(Debug, Clone)]
pub struct IndexRetriever {
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl IndexRetriever {
    pub fn new(index: Arc<dyn VectorIndex>, top_k: usize) -> Self {
        Self { index, top_k }
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, DomainError> {
        self.index.query(query, self.top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retrieval::MockVectorIndex;

    fn docs(n: usize) -> Vec<Document> {
        (0..n).map(|i| Document::new(format!("doc {}", i))).collect()
    }

    #[tokio::test]
    async fn test_retrieve_uses_top_k() {
        let index = Arc::new(MockVectorIndex::new(docs(10)));
        let retriever = IndexRetriever::new(index.clone(), 4);

        let result = retriever.retrieve("q").await.unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result[0].content(), "doc 0");
        assert_eq!(index.requested_k(), vec![4]);
    }

    #[tokio::test]
    async fn test_retrieve_propagates_index_errors() {
        let index = Arc::new(MockVectorIndex::new(vec![]).with_error("disk gone"));
        let retriever = IndexRetriever::new(index, 4);

        assert!(retriever.retrieve("q").await.is_err());
    }
}
