//! Decision executor trait and run outcome

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use super::error::WorkflowError;
use super::Node;
use crate::domain::decision::DecisionState;

/// Final state of a run plus the ordered list of visited nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub state: DecisionState,
    pub history: Vec<Node>,
    pub execution_time_ms: u64,
}

impl RunOutcome {
    pub fn node_names(&self) -> Vec<String> {
        self.history.iter().map(Node::name).collect()
    }

    /// How many times a node was visited
    pub fn visits(&self, node: Node) -> usize {
        self.history.iter().filter(|n| **n == node).count()
    }
}

/// Runs the decision pipeline to its terminal signal
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DecisionExecutor: Send + Sync + Debug {
    /// Run the pipeline for `query`; `run_id` keys the transition history
    async fn execute(&self, run_id: &str, query: &str) -> Result<RunOutcome, WorkflowError>;
}
