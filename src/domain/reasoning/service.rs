use std::fmt::Debug;

use async_trait::async_trait;

use super::{AgentRole, EvaluationContext};
use crate::domain::decision::{Evaluation, ResultOutput};
use crate::domain::DomainError;

/// Language-model calls consumed by the workflow.
///
/// Errors are provider failures (network, quota, malformed structured output)
/// and are never retried here.
#[async_trait]
pub trait ReasoningService: Send + Sync + Debug {
    /// Free-text answer from a drafting or retrieval agent
    async fn generate(&self, role: AgentRole, prompt: &str) -> Result<String, DomainError>;

    /// Structured four-field answer from the result agent
    async fn decide(&self, prompt: &str) -> Result<ResultOutput, DomainError>;

    /// Verdict from the evaluator paired with `role`
    async fn evaluate(
        &self,
        role: AgentRole,
        context: &EvaluationContext,
    ) -> Result<Evaluation, DomainError>;
}
