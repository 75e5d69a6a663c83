//! Fail-safe resolution of grader calls

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::crag::{CragError, Decision};
use crate::domain::DomainError;
use crate::infrastructure::metrics;

/// Await a grader call under `timeout`.
///
/// A provider error, a malformed reply or a timeout all yield the negative
/// decision; grading never fails a step on its own.
pub async fn grade_or_negative<D, F>(timeout: Duration, call: F) -> D
where
    D: Decision,
    F: Future<Output = Result<D, DomainError>>,
{
    let result = match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::timeout(format!("{} grader", D::GRADER), timeout)),
    };

    let decision = match result {
        Ok(decision) => decision,
        Err(e) => {
            let error = CragError::Grading(e);
            warn!(
                grader = D::GRADER,
                code = error.code(),
                error = %error,
                "Grader failed, falling back to negative decision"
            );
            metrics::record_grader_failsafe(D::GRADER);
            D::negative()
        }
    };

    debug!(grader = D::GRADER, decision = decision.label(), "Graded");
    metrics::record_grader_decision(D::GRADER, decision.label());

    decision
}
