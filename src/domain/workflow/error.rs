//! Workflow error types

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that end a decision workflow run
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Step execution failed in '{step}': {message}")]
    StepExecution { step: String, message: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl WorkflowError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn step_execution(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepExecution {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Wrap a reasoning failure with the node it happened in
    pub fn at_node(node: impl Into<String>, error: DomainError) -> Self {
        Self::step_execution(node, error.to_string())
    }
}
