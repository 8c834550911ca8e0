use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Shortest feedback comment an evaluator may return
pub const MIN_COMMENT_LENGTH: usize = 10;

/// Verdict returned by an evaluator on a drafted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub correct: bool,
    pub comment: String,
}

impl Evaluation {
    /// Build a verdict, rejecting trivial comments
    pub fn new(correct: bool, comment: impl Into<String>) -> Result<Self, DomainError> {
        let evaluation = Self {
            correct,
            comment: comment.into(),
        };
        evaluation.validate()?;
        Ok(evaluation)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.comment.trim().chars().count() < MIN_COMMENT_LENGTH {
            return Err(DomainError::validation(format!(
                "Evaluation comment must be at least {} characters",
                MIN_COMMENT_LENGTH
            )));
        }
        Ok(())
    }
}
