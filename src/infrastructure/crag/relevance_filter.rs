//! Per-document relevance grading with bounded fan-out

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::debug;

use super::fail_safe::grade_or_negative;
use crate::domain::crag::{Decision, RelevanceGrader};
use crate::domain::retrieval::Document;

/// Grade every document independently and keep the relevant ones.
///
/// Up to `concurrency` calls run at once; survivors keep their input order.
pub async fn filter_relevant(
    grader: &dyn RelevanceGrader,
    question: &str,
    documents: Vec<Document>,
    concurrency: usize,
    timeout: Duration,
) -> Vec<Document> {
    let total = documents.len();

    let mut graded: Vec<_> = stream::iter(documents.into_iter().enumerate())
        .map(move |(position, document)| async move {
            let decision =
                grade_or_negative(timeout, grader.grade_relevance(question, &document)).await;
            (position, document, decision)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    graded.sort_by_key(|(position, _, _)| *position);

    let relevant: Vec<Document> = graded
        .into_iter()
        .filter(|(_, _, decision)| decision.is_positive())
        .map(|(_, document, _)| document)
        .collect();

    debug!(total, relevant = relevant.len(), "Filtered documents");
    relevant
}
