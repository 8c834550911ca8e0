//! Synchronous decision runs

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::decision::{validate_decision_query, DecisionState};
use crate::domain::workflow::{DecisionExecutor, WorkflowError};

/// Flattened view of a finished decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub decision_requested: String,
    pub selected_decision: String,
    pub selected_decision_comment: String,
    pub alternative_decision: String,
    pub alternative_decision_comment: String,
    pub trigger: String,
    pub root_cause: String,
    pub scope_definition: String,
    pub decision_drafted: String,
    pub goals: String,
    pub complementary_info: String,
    pub complementary_info_num: u32,
    pub decision_draft_updated: String,
    pub alternatives: String,
}

impl From<&DecisionState> for DecisionSummary {
    fn from(state: &DecisionState) -> Self {
        Self {
            decision_requested: state.decision_requested().to_string(),
            selected_decision: state.result().to_string(),
            selected_decision_comment: state.result_comment().to_string(),
            alternative_decision: state.best_alternative_result().to_string(),
            alternative_decision_comment: state.best_alternative_result_comment().to_string(),
            trigger: state.trigger().to_string(),
            root_cause: state.root_cause().to_string(),
            scope_definition: state.scope_definition().to_string(),
            decision_drafted: state.decision_drafted().to_string(),
            goals: state.goals().to_string(),
            complementary_info: state.complementary_info().to_string(),
            complementary_info_num: state.complementary_info_num(),
            decision_draft_updated: state.decision_draft_updated().to_string(),
            alternatives: state.alternatives().to_string(),
        }
    }
}

/// Output of a synchronous run
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRunResult {
    pub run_id: String,
    pub state: DecisionState,
    /// Visited node names in order
    pub history: Vec<String>,
    pub execution_time_ms: u64,
}

impl DecisionRunResult {
    pub fn summary(&self) -> DecisionSummary {
        DecisionSummary::from(&self.state)
    }
}

/// Runs the workflow inline, without creating a process record
#[derive(Debug, Clone)]
pub struct DecisionService {
    executor: Arc<dyn DecisionExecutor>,
}

impl DecisionService {
    pub fn new(executor: Arc<dyn DecisionExecutor>) -> Self {
        Self { executor }
    }

    fn new_run_id() -> String {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        format!("run_{}", &hex[..12])
    }

    #[instrument(skip_all)]
    pub async fn run(&self, query: &str) -> Result<DecisionRunResult, WorkflowError> {
        let query = validate_decision_query(query)?;
        let run_id = Self::new_run_id();

        let outcome = self.executor.execute(&run_id, &query).await?;
        info!(
            run_id = %run_id,
            execution_time_ms = outcome.execution_time_ms,
            "Decision run finished"
        );

        Ok(DecisionRunResult {
            history: outcome.node_names(),
            run_id,
            state: outcome.state,
            execution_time_ms: outcome.execution_time_ms,
        })
    }
}
