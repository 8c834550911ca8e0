//! Transition history sink for diagnostics

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Append-only log of visited node names, one stream per run
#[async_trait]
pub trait TransitionLog: Send + Sync + Debug {
    async fn append(&self, run_id: &str, node: &str) -> Result<(), DomainError>;

    /// Ordered node names recorded for a run; empty when unknown
    async fn history(&self, run_id: &str) -> Result<Vec<String>, DomainError>;
}
