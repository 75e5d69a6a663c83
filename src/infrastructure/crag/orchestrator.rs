//! The self-correcting retrieval loop
//!
//! Drives `domain::crag::advance` with the side effects of each state. Every
//! collaborator call runs under the configured step timeout. Retrieval,
//! generation and rewrite failures end the run; grader failures fall back to
//! the negative decision and let the loop's own edges recover.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use super::fail_safe::grade_or_negative;
use super::relevance_filter::filter_relevant;
use crate::domain::crag::{
    advance, CragConfig, CragError, CragOutcome, CragRun, Decision, Generator, GroundednessGrader,
    LoopState, QueryRewriter, RelevanceGrader, RequestState, StepOutcome, UsefulnessGrader,
};
use crate::domain::retrieval::Retriever;
use crate::domain::DomainError;
use crate::infrastructure::metrics;

/// Everything the loop calls out to, injected at construction
#[derive(Debug, Clone)]
pub struct CragCollaborators {
    pub retriever: Arc<dyn Retriever>,
    pub relevance: Arc<dyn RelevanceGrader>,
    pub generator: Arc<dyn Generator>,
    pub groundedness: Arc<dyn GroundednessGrader>,
    pub usefulness: Arc<dyn UsefulnessGrader>,
    pub rewriter: Arc<dyn QueryRewriter>,
}

/// Runs one question at a time through the loop; holds no per-request state
#[derive(Debug, Clone)]
pub struct Orchestrator {
    collaborators: CragCollaborators,
    config: CragConfig,
}

impl Orchestrator {
    pub fn new(collaborators: CragCollaborators, config: CragConfig) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            collaborators,
            config,
        })
    }

    pub fn config(&self) -> &CragConfig {
        &self.config
    }

    /// Answer `question`, returning the terminal outcome and the path taken
    #[instrument(skip(self), fields(max_iterations = self.config.max_iterations))]
    pub async fn run(&self, question: &str) -> CragRun {
        let started = Instant::now();
        let mut state = RequestState::new(question);
        let mut current = LoopState::INITIAL;
        let mut trace = vec![current];

        info!(state = %current, iteration = 0, "Starting loop");

        let outcome = loop {
            let step = match self.execute(current, &mut state).await {
                Ok(step) => step,
                Err(reason) => {
                    warn!(state = %current, error = %reason, "Step failed");
                    break abort(current, reason, &state, &mut trace);
                }
            };

            let Some(next) = advance(current, step, state.iteration(), self.config.max_iterations)
            else {
                let reason = CragError::InvalidTransition {
                    from: current,
                    outcome: format!("{:?}", step),
                };
                break abort(current, reason, &state, &mut trace);
            };

            metrics::record_transition(current, next.to);
            state.set_iteration(next.iteration);
            trace.push(next.to);

            info!(
                from = %current,
                state = %next.to,
                iteration = next.iteration,
                "Transition"
            );

            match next.to {
                LoopState::Done => {
                    let answer = state.answer().unwrap_or_default().to_string();
                    break CragOutcome::Done { answer };
                }
                LoopState::Failed => {
                    let reason = CragError::IterationBoundExceeded {
                        iterations: state.iteration(),
                        max_iterations: self.config.max_iterations,
                    };
                    break failed(reason, &state);
                }
                to => current = to,
            }
        };

        metrics::record_outcome(outcome.label(), started.elapsed());

        match &outcome {
            CragOutcome::Done { .. } => {
                info!(iterations = state.iteration(), "Loop finished with an answer")
            }
            CragOutcome::Failed { reason, .. } => {
                warn!(iterations = state.iteration(), code = reason.code(), "Loop failed")
            }
        }

        CragRun {
            outcome,
            trace,
            iterations: state.iteration(),
            final_question: state.question().to_string(),
        }
    }

    /// Perform the side effect of `current` and report what happened
    async fn execute(
        &self,
        current: LoopState,
        state: &mut RequestState,
    ) -> Result<StepOutcome, CragError> {
        let c = &self.collaborators;
        let timeout = self.config.step_timeout;

        match current {
            LoopState::Retrieving => {
                let documents = self
                    .bounded("retrieve", c.retriever.retrieve(state.question()))
                    .await
                    .map_err(CragError::Retrieval)?;

                info!(documents = documents.len(), "Retrieved");
                state.set_documents(documents);
                Ok(StepOutcome::Retrieved)
            }

            LoopState::Grading => {
                let candidates = state.documents().to_vec();
                let relevant = filter_relevant(
                    c.relevance.as_ref(),
                    state.question(),
                    candidates,
                    self.config.grading_concurrency,
                    timeout,
                )
                .await;

                let count = relevant.len();
                state.set_documents(relevant);
                Ok(StepOutcome::Filtered { relevant: count })
            }

            LoopState::Generating => {
                let answer = self
                    .bounded(
                        "generate",
                        c.generator.generate(state.question(), state.documents()),
                    )
                    .await
                    .map_err(CragError::Generation)?;

                state.set_answer(answer);
                Ok(StepOutcome::Generated)
            }

            LoopState::CheckingGroundedness => {
                let answer = state.answer().unwrap_or_default();
                let decision = grade_or_negative(
                    timeout,
                    c.groundedness.grade_groundedness(state.documents(), answer),
                )
                .await;

                if decision.is_positive() {
                    state.mark_grounded();
                }
                Ok(StepOutcome::Groundedness(decision))
            }

            LoopState::CheckingUsefulness => {
                let answer = state.answer().unwrap_or_default();
                let decision = grade_or_negative(
                    timeout,
                    c.usefulness.grade_usefulness(state.question(), answer),
                )
                .await;

                Ok(StepOutcome::Usefulness(decision))
            }

            LoopState::Rewriting => {
                let question = self
                    .bounded("rewrite", c.rewriter.rewrite(state.question()))
                    .await
                    .map_err(CragError::Rewrite)?;

                info!(question = %question, "Rewrote question");
                state.set_question(question);
                Ok(StepOutcome::Rewritten)
            }

            LoopState::Done | LoopState::Failed => Err(CragError::InvalidTransition {
                from: current,
                outcome: "terminal state has no step".to_string(),
            }),
        }
    }

    /// Run a collaborator call under the step timeout
    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        let timeout = self.config.step_timeout;

        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| DomainError::timeout(operation, timeout))?
    }
}

/// Leave `from` for FAILED outside the transition table
fn abort(
    from: LoopState,
    reason: CragError,
    state: &RequestState,
    trace: &mut Vec<LoopState>,
) -> CragOutcome {
    metrics::record_transition(from, LoopState::Failed);
    trace.push(LoopState::Failed);
    failed(reason, state)
}

fn failed(reason: CragError, state: &RequestState) -> CragOutcome {
    CragOutcome::Failed {
        reason,
        best_answer: state.best_answer().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crag::{
        Groundedness, MockGenerator, MockGroundednessGrader, MockQueryRewriter,
        MockRelevanceGrader, MockUsefulnessGrader, Usefulness,
    };
    use crate::domain::retrieval::{Document, MockRetriever};
    use std::time::Duration;
    use LoopState::*;

    struct Harness {
        retriever: Arc<MockRetriever>,
        relevance: Arc<MockRelevanceGrader>,
        generator: Arc<MockGenerator>,
        groundedness: Arc<MockGroundednessGrader>,
        usefulness: Arc<MockUsefulnessGrader>,
        rewriter: Arc<MockQueryRewriter>,
        config: CragConfig,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                retriever: Arc::new(MockRetriever::new().then_return(vec![Document::new("D")])),
                relevance: Arc::new(MockRelevanceGrader::new().relevant("D")),
                generator: Arc::new(MockGenerator::new().then_answer("A")),
                groundedness: Arc::new(MockGroundednessGrader::new()),
                usefulness: Arc::new(MockUsefulnessGrader::new()),
                rewriter: Arc::new(MockQueryRewriter::new()),
                config: CragConfig::new()
                    .with_max_iterations(3)
                    .with_step_timeout(Duration::from_secs(2)),
            }
        }

        fn retriever(mut self, retriever: MockRetriever) -> Self {
            self.retriever = Arc::new(retriever);
            self
        }

        fn relevance(mut self, relevance: MockRelevanceGrader) -> Self {
            self.relevance = Arc::new(relevance);
            self
        }

        fn generator(mut self, generator: MockGenerator) -> Self {
            self.generator = Arc::new(generator);
            self
        }

        fn groundedness(mut self, groundedness: MockGroundednessGrader) -> Self {
            self.groundedness = Arc::new(groundedness);
            self
        }

        fn usefulness(mut self, usefulness: MockUsefulnessGrader) -> Self {
            self.usefulness = Arc::new(usefulness);
            self
        }

        fn rewriter(mut self, rewriter: MockQueryRewriter) -> Self {
            self.rewriter = Arc::new(rewriter);
            self
        }

        fn config(mut self, config: CragConfig) -> Self {
            self.config = config;
            self
        }

        fn orchestrator(&self) -> Orchestrator {
            let collaborators = CragCollaborators {
                retriever: self.retriever.clone(),
                relevance: self.relevance.clone(),
                generator: self.generator.clone(),
                groundedness: self.groundedness.clone(),
                usefulness: self.usefulness.clone(),
                rewriter: self.rewriter.clone(),
            };
            Orchestrator::new(collaborators, self.config.clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn test_happy_path() {
        let harness = Harness::new();

        let run = harness.orchestrator().run("Q").await;

        assert_eq!(run.outcome.answer(), Some("A"));
        assert_eq!(
            run.trace,
            vec![
                Retrieving,
                Grading,
                Generating,
                CheckingGroundedness,
                CheckingUsefulness,
                Done
            ]
        );
        assert_eq!(run.iterations, 0);
        assert_eq!(run.final_question, "Q");
        assert_eq!(harness.generator.call_count(), 1);
        assert_eq!(harness.rewriter.call_count(), 0);
    }

    #[tokio::test]
    async fn test_irrelevant_then_relevant_rewrites_once() {
        let harness = Harness::new()
            .retriever(
                MockRetriever::new()
                    .then_return(vec![Document::new("noise 1"), Document::new("noise 2")])
                    .then_return(vec![Document::new("D")]),
            );

        let run = harness.orchestrator().run("Q").await;

        assert!(run.outcome.is_done());
        assert_eq!(run.iterations, 1);
        assert_eq!(
            &run.trace[..5],
            &[Retrieving, Grading, Rewriting, Retrieving, Grading]
        );
        assert_eq!(harness.rewriter.inputs(), vec!["Q"]);
        assert_eq!(harness.retriever.queries(), vec!["Q", "Q (rewrite 1)"]);
        assert_eq!(run.final_question, "Q (rewrite 1)");
    }

    #[tokio::test]
    async fn test_ungrounded_answer_regenerates_with_same_documents() {
        let harness = Harness::new()
            .retriever(
                MockRetriever::new().then_return(vec![Document::new("D"), Document::new("E")]),
            )
            .relevance(MockRelevanceGrader::new().relevant("D").relevant("E"))
            .generator(MockGenerator::new().then_answer("A1").then_answer("A2"))
            .groundedness(MockGroundednessGrader::new().then(Groundedness::NotGrounded));

        let run = harness.orchestrator().run("Q").await;

        assert_eq!(run.outcome.answer(), Some("A2"));
        assert_eq!(run.iterations, 1);
        assert_eq!(harness.generator.call_count(), 2);
        assert_eq!(harness.rewriter.call_count(), 0);

        let sets = harness.generator.document_sets();
        assert_eq!(sets[0], sets[1]);
        assert_eq!(sets[0].len(), 2);
    }

    #[tokio::test]
    async fn test_grounded_but_not_useful_rewrites() {
        let harness = Harness::new()
            .generator(MockGenerator::new().then_answer("A1").then_answer("A2"))
            .usefulness(MockUsefulnessGrader::new().then(Usefulness::NotUseful));

        let run = harness.orchestrator().run("Q").await;

        assert_eq!(
            &run.trace[..7],
            &[
                Retrieving,
                Grading,
                Generating,
                CheckingGroundedness,
                CheckingUsefulness,
                Rewriting,
                Retrieving
            ]
        );
        assert_eq!(run.outcome.answer(), Some("A2"));
        assert_eq!(harness.rewriter.call_count(), 1);
    }

    #[tokio::test]
    async fn test_never_relevant_hits_the_bound() {
        let harness = Harness::new().relevance(MockRelevanceGrader::new());

        let run = harness.orchestrator().run("Q").await;

        match &run.outcome {
            CragOutcome::Failed {
                reason,
                best_answer,
            } => {
                assert_eq!(reason.code(), "ITERATION_BOUND_EXCEEDED");
                assert!(best_answer.is_none());
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(run.iterations, 3);
        assert_eq!(run.trace.last(), Some(&Failed));
        assert_eq!(harness.retriever.queries().len(), 4);
        assert_eq!(harness.rewriter.call_count(), 3);
        assert_eq!(harness.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_never_grounded_hits_the_bound_with_last_answer() {
        let harness = Harness::new()
            .generator(
                MockGenerator::new()
                    .then_answer("A1")
                    .then_answer("A2")
                    .then_answer("A3")
                    .then_answer("A4"),
            )
            .groundedness(MockGroundednessGrader::new().always(Groundedness::NotGrounded));

        let run = harness.orchestrator().run("Q").await;

        match &run.outcome {
            CragOutcome::Failed {
                reason,
                best_answer,
            } => {
                assert!(matches!(reason, CragError::IterationBoundExceeded { .. }));
                assert_eq!(best_answer.as_deref(), Some("A4"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(harness.generator.call_count(), 4);
        assert_eq!(harness.usefulness.call_count(), 0);
    }

    #[tokio::test]
    async fn test_best_answer_prefers_last_grounded() {
        let harness = Harness::new()
            .generator(MockGenerator::new().then_answer("grounded").then_answer("later"))
            .groundedness(
                MockGroundednessGrader::new()
                    .then(Groundedness::Grounded)
                    .always(Groundedness::NotGrounded),
            )
            .usefulness(MockUsefulnessGrader::new().always(Usefulness::NotUseful))
            .config(CragConfig::new().with_max_iterations(1));

        let run = harness.orchestrator().run("Q").await;

        // grounded -> not useful -> rewrite (iteration 1) -> ... -> not grounded -> bound
        match run.outcome {
            CragOutcome::Failed { best_answer, .. } => {
                assert_eq!(best_answer.as_deref(), Some("grounded"))
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_usefulness_never_follows_not_grounded() {
        let harness = Harness::new()
            .generator(MockGenerator::new().then_answer("A1").then_answer("A2"))
            .groundedness(
                MockGroundednessGrader::new()
                    .then(Groundedness::NotGrounded)
                    .then(Groundedness::Grounded),
            );

        let run = harness.orchestrator().run("Q").await;

        for pair in run.trace.windows(2) {
            if pair[0] == CheckingGroundedness {
                let grounded_next = pair[1] == CheckingUsefulness;
                let retried = pair[1] == Generating;
                assert!(grounded_next || retried);
            }
        }
        assert_eq!(harness.groundedness.call_count(), 2);
        assert_eq!(harness.usefulness.call_count(), 1);
    }

    #[tokio::test]
    async fn test_grader_errors_are_negative_not_fatal() {
        let harness = Harness::new()
            .relevance(MockRelevanceGrader::new().failing_on("D", "not json"))
            .config(CragConfig::new().with_max_iterations(1));

        let run = harness.orchestrator().run("Q").await;

        match run.outcome {
            CragOutcome::Failed { reason, .. } => {
                assert_eq!(reason.code(), "ITERATION_BOUND_EXCEEDED")
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_groundedness_error_retries_generation() {
        let harness = Harness::new()
            .generator(MockGenerator::new().then_answer("A1").then_answer("A2"))
            .groundedness(MockGroundednessGrader::new().then_fail("garbled"));

        let run = harness.orchestrator().run("Q").await;

        assert_eq!(run.outcome.answer(), Some("A2"));
        assert_eq!(harness.generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_usefulness_error_rewrites() {
        let harness = Harness::new()
            .usefulness(MockUsefulnessGrader::new().then_fail("timeout upstream"));

        let run = harness.orchestrator().run("Q").await;

        assert!(run.outcome.is_done());
        assert_eq!(harness.rewriter.call_count(), 1);
    }

    #[tokio::test]
    async fn test_slow_grader_times_out_to_negative() {
        let harness = Harness::new()
            .generator(MockGenerator::new().then_answer("A1").then_answer("A2"))
            .groundedness(MockGroundednessGrader::new().with_delay(Duration::from_millis(300)))
            .config(
                CragConfig::new()
                    .with_max_iterations(1)
                    .with_step_timeout(Duration::from_millis(50)),
            );

        let run = harness.orchestrator().run("Q").await;

        match run.outcome {
            CragOutcome::Failed {
                reason,
                best_answer,
            } => {
                assert_eq!(reason.code(), "ITERATION_BOUND_EXCEEDED");
                assert_eq!(best_answer.as_deref(), Some("A2"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_terminal() {
        let harness = Harness::new().retriever(MockRetriever::new().then_fail("index missing"));

        let run = harness.orchestrator().run("Q").await;

        match run.outcome {
            CragOutcome::Failed { reason, .. } => {
                assert!(matches!(reason, CragError::Retrieval(_)));
                assert!(reason.to_string().contains("index missing"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(run.trace, vec![Retrieving, Failed]);
    }

    #[tokio::test]
    async fn test_generation_failure_is_terminal() {
        let harness = Harness::new().generator(MockGenerator::new().then_fail("quota"));

        let run = harness.orchestrator().run("Q").await;

        match run.outcome {
            CragOutcome::Failed {
                reason,
                best_answer,
            } => {
                assert_eq!(reason.code(), "GENERATION_ERROR");
                assert!(best_answer.is_none());
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rewrite_failure_is_terminal() {
        let harness = Harness::new()
            .relevance(MockRelevanceGrader::new())
            .rewriter(MockQueryRewriter::new().with_error("down"));

        let run = harness.orchestrator().run("Q").await;

        match run.outcome {
            CragOutcome::Failed { reason, .. } => assert_eq!(reason.code(), "REWRITE_ERROR"),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(run.trace, vec![Retrieving, Grading, Rewriting, Failed]);
    }

    #[tokio::test]
    async fn test_empty_retrieval_forces_rewrite() {
        let harness = Harness::new().retriever(
            MockRetriever::new()
                .then_return(vec![])
                .then_return(vec![Document::new("D")]),
        );

        let run = harness.orchestrator().run("Q").await;

        assert!(run.outcome.is_done());
        assert_eq!(&run.trace[..3], &[Retrieving, Grading, Rewriting]);
    }

    #[tokio::test]
    async fn test_every_decision_mix_terminates_within_bound() {
        let max_iterations = 2;

        for relevant in [false, true] {
            for grounded in [
                Groundedness::Grounded,
                Groundedness::NotGrounded,
            ] {
                for useful in [Usefulness::Useful, Usefulness::NotUseful] {
                    let relevance = if relevant {
                        MockRelevanceGrader::new().relevant("D")
                    } else {
                        MockRelevanceGrader::new()
                    };
                    let harness = Harness::new()
                        .relevance(relevance)
                        .groundedness(MockGroundednessGrader::new().always(grounded))
                        .usefulness(MockUsefulnessGrader::new().always(useful))
                        .config(CragConfig::new().with_max_iterations(max_iterations));

                    let run = harness.orchestrator().run("Q").await;

                    assert!(run.iterations <= max_iterations);
                    assert!(run.trace.last().is_some_and(|s| s.is_terminal()));
                    let expect_done = relevant
                        && grounded == Groundedness::Grounded
                        && useful == Usefulness::Useful;
                    assert_eq!(run.outcome.is_done(), expect_done);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let harness = Harness::new();
        let collaborators = CragCollaborators {
            retriever: harness.retriever.clone(),
            relevance: harness.relevance.clone(),
            generator: harness.generator.clone(),
            groundedness: harness.groundedness.clone(),
            usefulness: harness.usefulness.clone(),
            rewriter: harness.rewriter.clone(),
        };

        let result = Orchestrator::new(collaborators, CragConfig::new().with_max_iterations(0));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_terminal_state_aborts_with_invalid_transition() {
        let orchestrator = Harness::new().orchestrator();
        let mut state = RequestState::new("Q");
        state.set_answer("draft");
        let mut trace = vec![Retrieving, Done];

        let reason = orchestrator.execute(Done, &mut state).await.unwrap_err();
        assert_eq!(reason.code(), "INVALID_TRANSITION");

        let outcome = abort(Done, reason, &state, &mut trace);

        assert_eq!(trace, vec![Retrieving, Done, Failed]);
        match outcome {
            CragOutcome::Failed { reason, best_answer } => {
                assert!(matches!(reason, CragError::InvalidTransition { from: Done, .. }));
                assert_eq!(best_answer.as_deref(), Some("draft"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
