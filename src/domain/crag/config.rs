//! Loop configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::DomainError;

/// Limits applied to one run of the self-correcting loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CragConfig {
    /// Maximum number of re-entries (re-retrieval or regeneration) per question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Deadline for each collaborator call
    #[serde(default = "default_step_timeout", with = "duration_secs")]
    pub step_timeout: Duration,
    /// How many relevance grading calls may be in flight at once
    #[serde(default = "default_grading_concurrency")]
    pub grading_concurrency: usize,
}

fn default_max_iterations() -> u32 {
    3
}

fn default_step_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_grading_concurrency() -> usize {
    4
}

impl Default for CragConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            step_timeout: default_step_timeout(),
            grading_concurrency: default_grading_concurrency(),
        }
    }
}

impl CragConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    pub fn with_grading_concurrency(mut self, grading_concurrency: usize) -> Self {
        self.grading_concurrency = grading_concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_iterations == 0 {
            return Err(DomainError::configuration(
                "crag.max_iterations must be at least 1",
            ));
        }

        if self.step_timeout.is_zero() {
            return Err(DomainError::configuration(
                "crag.step_timeout_secs must be greater than 0",
            ));
        }

        if self.grading_concurrency == 0 {
            return Err(DomainError::configuration(
                "crag.grading_concurrency must be at least 1",
            ));
        }

        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
