//! Retriever trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::Document;
use crate::domain::DomainError;

/// Query → ordered documents, most similar first. May return nothing.
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Retriever that replays one scripted result per call, repeating the last one
    #[derive(Debug, Default)]
    pub struct MockRetriever {
        script: Mutex<VecDeque<Result<Vec<Document>, String>>>,
        last: Mutex<Option<Result<Vec<Document>, String>>>,
        queries: Mutex<Vec<String>>,
    }

    impl MockRetriever {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn then_return(self, documents: Vec<Document>) -> Self {
            self.script.lock().unwrap().push_back(Ok(documents));
            self
        }

        pub fn then_fail(self, error: impl Into<String>) -> Self {
            self.script.lock().unwrap().push_back(Err(error.into()));
            self
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Retriever for MockRetriever {
        async fn retrieve(&self, query: &str) -> Result<Vec<Document>, DomainError> {
            self.queries.lock().unwrap().push(query.to_string());

            let next = self.script.lock().unwrap().pop_front();
            let result = match next {
                Some(result) => {
                    *self.last.lock().unwrap() = Some(result.clone());
                    result
                }
                None => self.last.lock().unwrap().clone().unwrap_or(Ok(Vec::new())),
            };

            result.map_err(|e| DomainError::index(e))
        }
    }
}
