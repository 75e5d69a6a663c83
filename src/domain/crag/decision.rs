//! Binary grader decisions and the structured score they are parsed from

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::llm::LlmJsonSchema;
use crate::domain::DomainError;

/// Raw yes/no verdict returned by a binary grader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryScore {
    Yes,
    No,
}

/// Fixed shape of every structured grader reply
#[derive(Debug, Deserialize)]
struct BinaryScoreOutput {
    binary_score: String,
}

impl BinaryScore {
    /// Parse a grader reply.
    ///
    /// The reply is expected to carry a `{"binary_score": "yes"|"no"}` object,
    /// possibly wrapped in prose or a code fence. Without any JSON object the
    /// whole (trimmed) reply is taken as the score. Only the exact strings
    /// `yes` and `no` are accepted.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let value = match first_json_object(raw) {
            Some(output) => {
                output
                    .map_err(|e| {
                        DomainError::validation(format!("Invalid binary score payload: {}", e))
                    })?
                    .binary_score
            }
            None => raw.trim().to_string(),
        };

        match value.as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            other => Err(DomainError::validation(format!(
                "Binary score must be 'yes' or 'no', got '{}'",
                other
            ))),
        }
    }

    /// JSON schema sent with structured grader requests
    pub fn json_schema() -> LlmJsonSchema {
        LlmJsonSchema {
            name: "binary_score".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "binary_score": {
                        "type": "string",
                        "enum": ["yes", "no"],
                        "description": "Binary score 'yes' or 'no'"
                    }
                },
                "required": ["binary_score"],
                "additionalProperties": false
            }),
            strict: true,
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// Deserialize the first JSON object in `text`, ignoring whatever follows it
/// (closing code fences, trailing prose, further objects)
fn first_json_object(text: &str) -> Option<Result<BinaryScoreOutput, serde_json::Error>> {
    let start = text.find('{')?;

    serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<BinaryScoreOutput>()
        .next()
}

/// Common surface of the three two-valued grader decisions
pub trait Decision: Copy + fmt::Debug + Send + Sync + 'static {
    /// Name of the grader producing this decision, used in logs and metrics
    const GRADER: &'static str;

    fn from_score(score: BinaryScore) -> Self;

    /// Fail-safe value used whenever the grader cannot be trusted
    fn negative() -> Self;

    fn is_positive(&self) -> bool;

    fn label(&self) -> &'static str;
}

/// Whether a retrieved document bears on the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relevance {
    Relevant,
    NotRelevant,
}

/// Whether an answer is supported by the documents it was generated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Groundedness {
    Grounded,
    NotGrounded,
}

/// Whether an answer resolves the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Usefulness {
    Useful,
    NotUseful,
}

impl Decision for Relevance {
    const GRADER: &'static str = "relevance";

    fn from_score(score: BinaryScore) -> Self {
        if score.is_yes() { Self::Relevant } else { Self::NotRelevant }
    }

    fn negative() -> Self {
        Self::NotRelevant
    }

    fn is_positive(&self) -> bool {
        matches!(self, Self::Relevant)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Relevant => "RELEVANT",
            Self::NotRelevant => "NOT_RELEVANT",
        }
    }
}

impl Decision for Groundedness {
    const GRADER: &'static str = "groundedness";

    fn from_score(score: BinaryScore) -> Self {
        if score.is_yes() { Self::Grounded } else { Self::NotGrounded }
    }

    fn negative() -> Self {
        Self::NotGrounded
    }

    fn is_positive(&self) -> bool {
        matches!(self, Self::Grounded)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Grounded => "GROUNDED",
            Self::NotGrounded => "NOT_GROUNDED",
        }
    }
}

impl Decision for Usefulness {
    const GRADER: &'static str = "usefulness";

    fn from_score(score: BinaryScore) -> Self {
        if score.is_yes() { Self::Useful } else { Self::NotUseful }
    }

    fn negative() -> Self {
        Self::NotUseful
    }

    fn is_positive(&self) -> bool {
        matches!(self, Self::Useful)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Useful => "USEFUL",
            Self::NotUseful => "NOT_USEFUL",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(Relevance, Groundedness, Usefulness);
