//! Explicit state machine for the self-correcting loop.
//!
//! `transition` is the pure table of edges. `advance` layers the iteration
//! bound on top of it: the two re-entry edges (`Rewriting -> Retrieving` and
//! `CheckingGroundedness -> Generating`) each consume one iteration, and a
//! move that would need an iteration beyond the maximum lands in `Failed`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::decision::{Groundedness, Usefulness};

/// States of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopState {
    Retrieving,
    Grading,
    Generating,
    CheckingGroundedness,
    CheckingUsefulness,
    Rewriting,
    Done,
    Failed,
}

impl LoopState {
    pub const INITIAL: LoopState = LoopState::Retrieving;

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieving => "RETRIEVING",
            Self::Grading => "GRADING",
            Self::Generating => "GENERATING",
            Self::CheckingGroundedness => "CHECKING_GROUNDEDNESS",
            Self::CheckingUsefulness => "CHECKING_USEFULNESS",
            Self::Rewriting => "REWRITING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a non-terminal state's side effect produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Retrieved,
    Filtered { relevant: usize },
    Generated,
    Groundedness(Groundedness),
    Usefulness(Usefulness),
    Rewritten,
}

/// Pure transition table. `None` when `outcome` cannot come out of `from`.
pub fn transition(from: LoopState, outcome: StepOutcome) -> Option<LoopState> {
    use LoopState::*;

    let to = match (from, outcome) {
        (Retrieving, StepOutcome::Retrieved) => Grading,
        (Grading, StepOutcome::Filtered { relevant: 0 }) => Rewriting,
        (Grading, StepOutcome::Filtered { .. }) => Generating,
        (Generating, StepOutcome::Generated) => CheckingGroundedness,
        (CheckingGroundedness, StepOutcome::Groundedness(Groundedness::Grounded)) => {
            CheckingUsefulness
        }
        (CheckingGroundedness, StepOutcome::Groundedness(Groundedness::NotGrounded)) => Generating,
        (CheckingUsefulness, StepOutcome::Usefulness(Usefulness::Useful)) => Done,
        (CheckingUsefulness, StepOutcome::Usefulness(Usefulness::NotUseful)) => Rewriting,
        (Rewriting, StepOutcome::Rewritten) => Retrieving,
        _ => return None,
    };

    Some(to)
}

/// Whether `from -> to` re-enters the loop and so consumes an iteration
pub fn is_reentry(from: LoopState, to: LoopState) -> bool {
    matches!(
        (from, to),
        (LoopState::Rewriting, LoopState::Retrieving)
            | (LoopState::CheckingGroundedness, LoopState::Generating)
    )
}

/// Whether taking `from -> to` commits the loop to a re-entry.
///
/// Entering `Rewriting` always ends in `Rewriting -> Retrieving`, so the bound
/// is checked there and the rewrite call is skipped when it could not be used.
fn commits_to_reentry(from: LoopState, to: LoopState) -> bool {
    to == LoopState::Rewriting || is_reentry(from, to)
}

/// Result of a bounded step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub to: LoopState,
    pub iteration: u32,
}

/// Apply `transition` and the iteration bound.
///
/// Returns `to == Failed` when the move would need more than `max_iterations`
/// re-entries, otherwise the next state with the updated iteration counter.
pub fn advance(
    from: LoopState,
    outcome: StepOutcome,
    iteration: u32,
    max_iterations: u32,
) -> Option<Advance> {
    let to = transition(from, outcome)?;

    if commits_to_reentry(from, to) && iteration >= max_iterations {
        return Some(Advance {
            to: LoopState::Failed,
            iteration,
        });
    }

    let iteration = if is_reentry(from, to) {
        iteration + 1
    } else {
        iteration
    };

    Some(Advance { to, iteration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use LoopState::*;

    const ALL_STATES: [LoopState; 8] = [
        Retrieving,
        Grading,
        Generating,
        CheckingGroundedness,
        CheckingUsefulness,
        Rewriting,
        Done,
        Failed,
    ];

    fn all_outcomes() -> Vec<StepOutcome> {
        vec![
            StepOutcome::Retrieved,
            StepOutcome::Filtered { relevant: 0 },
            StepOutcome::Filtered { relevant: 3 },
            StepOutcome::Generated,
            StepOutcome::Groundedness(Groundedness::Grounded),
            StepOutcome::Groundedness(Groundedness::NotGrounded),
            StepOutcome::Usefulness(Usefulness::Useful),
            StepOutcome::Usefulness(Usefulness::NotUseful),
            StepOutcome::Rewritten,
        ]
    }

    #[test]
    fn test_transition_table() {
        let cases = [
            (Retrieving, StepOutcome::Retrieved, Grading),
            (Grading, StepOutcome::Filtered { relevant: 2 }, Generating),
            (Grading, StepOutcome::Filtered { relevant: 0 }, Rewriting),
            (Generating, StepOutcome::Generated, CheckingGroundedness),
            (
                CheckingGroundedness,
                StepOutcome::Groundedness(Groundedness::Grounded),
                CheckingUsefulness,
            ),
            (
                CheckingGroundedness,
                StepOutcome::Groundedness(Groundedness::NotGrounded),
                Generating,
            ),
            (
                CheckingUsefulness,
                StepOutcome::Usefulness(Usefulness::Useful),
                Done,
            ),
            (
                CheckingUsefulness,
                StepOutcome::Usefulness(Usefulness::NotUseful),
                Rewriting,
            ),
            (Rewriting, StepOutcome::Rewritten, Retrieving),
        ];

        for (from, outcome, to) in cases {
            assert_eq!(transition(from, outcome), Some(to), "{} on {:?}", from, outcome);
        }
    }

    #[test]
    fn test_terminal_states_have_no_edges() {
        for outcome in all_outcomes() {
            assert_eq!(transition(Done, outcome), None);
            assert_eq!(transition(Failed, outcome), None);
        }
    }

    #[test]
    fn test_mismatched_outcome_is_rejected() {
        assert_eq!(transition(Retrieving, StepOutcome::Generated), None);
        assert_eq!(
            transition(Generating, StepOutcome::Usefulness(Usefulness::Useful)),
            None
        );
    }

    #[test]
    fn test_not_useful_rewrites_instead_of_regenerating() {
        let next = transition(
            CheckingUsefulness,
            StepOutcome::Usefulness(Usefulness::NotUseful),
        );
        assert_eq!(next, Some(Rewriting));
    }

    #[test]
    fn test_only_reentry_edges_increment() {
        let step = advance(Rewriting, StepOutcome::Rewritten, 0, 3).unwrap();
        assert_eq!(step, Advance { to: Retrieving, iteration: 1 });

        let step = advance(
            CheckingGroundedness,
            StepOutcome::Groundedness(Groundedness::NotGrounded),
            1,
            3,
        )
        .unwrap();
        assert_eq!(step, Advance { to: Generating, iteration: 2 });

        let step = advance(Retrieving, StepOutcome::Retrieved, 2, 3).unwrap();
        assert_eq!(step, Advance { to: Grading, iteration: 2 });
    }

    #[test]
    fn test_bound_fails_before_reentry() {
        let step = advance(
            CheckingGroundedness,
            StepOutcome::Groundedness(Groundedness::NotGrounded),
            3,
            3,
        )
        .unwrap();
        assert_eq!(step, Advance { to: Failed, iteration: 3 });

        let step = advance(Grading, StepOutcome::Filtered { relevant: 0 }, 3, 3).unwrap();
        assert_eq!(step.to, Failed);
    }

    #[test]
    fn test_bound_does_not_block_forward_edges() {
        let step = advance(
            CheckingUsefulness,
            StepOutcome::Usefulness(Usefulness::Useful),
            3,
            3,
        )
        .unwrap();
        assert_eq!(step.to, Done);
    }

    #[test]
    fn test_reentry_edges() {
        for from in ALL_STATES {
            for to in ALL_STATES {
                let expected = matches!(
                    (from, to),
                    (Rewriting, Retrieving) | (CheckingGroundedness, Generating)
                );
                assert_eq!(is_reentry(from, to), expected);
            }
        }
    }

    /// Drive the machine with every possible decision sequence drawn from a
    /// small generator and check it always terminates within the bound.
    #[test]
    fn test_any_decision_sequence_terminates() {
        let max_iterations = 3;

        for seed in 0u32..4096 {
            let mut bits = seed;
            let mut next_bit = move || {
                let bit = bits & 1 == 1;
                bits = bits.rotate_right(1);
                bit
            };

            let mut state = LoopState::INITIAL;
            let mut iteration = 0;
            let mut steps = 0;

            while !state.is_terminal() {
                let outcome = match state {
                    Retrieving => StepOutcome::Retrieved,
                    Grading => StepOutcome::Filtered {
                        relevant: usize::from(next_bit()),
                    },
                    Generating => StepOutcome::Generated,
                    CheckingGroundedness => StepOutcome::Groundedness(if next_bit() {
                        Groundedness::Grounded
                    } else {
                        Groundedness::NotGrounded
                    }),
                    CheckingUsefulness => StepOutcome::Usefulness(if next_bit() {
                        Usefulness::Useful
                    } else {
                        Usefulness::NotUseful
                    }),
                    Rewriting => StepOutcome::Rewritten,
                    Done | Failed => unreachable!(),
                };

                let step = advance(state, outcome, iteration, max_iterations).unwrap();
                assert!(step.iteration >= iteration);
                state = step.to;
                iteration = step.iteration;
                steps += 1;

                assert!(iteration <= max_iterations);
                assert!(steps <= 6 * (max_iterations as usize + 1), "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckingGroundedness.to_string(), "CHECKING_GROUNDEDNESS");
        assert!(Done.is_terminal());
        assert!(!Rewriting.is_terminal());
    }
}
