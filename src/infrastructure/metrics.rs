//! Loop metrics, emitted through the `metrics` facade
//!
//! No exporter is installed here; whatever recorder the host process installs
//! receives these series.

use std::time::Duration;

use metrics::{counter, histogram};

use crate::domain::crag::LoopState;

/// Record one state machine transition
pub fn record_transition(from: LoopState, to: LoopState) {
    counter!(
        "crag_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

/// Record a grader decision, whether it came from the model or the fail-safe default
pub fn record_grader_decision(grader: &'static str, decision: &'static str) {
    counter!(
        "crag_grader_decisions_total",
        "grader" => grader,
        "decision" => decision
    )
    .increment(1);
}

/// Record a grader call that failed or timed out and was replaced by the negative decision
pub fn record_grader_failsafe(grader: &'static str) {
    counter!("crag_grader_failsafe_total", "grader" => grader).increment(1);
}

/// Record how a question ended and how long it took
pub fn record_outcome(outcome: &'static str, duration: Duration) {
    counter!("crag_outcomes_total", "outcome" => outcome).increment(1);
    histogram!("crag_request_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}
