//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::{DecisionService, ProcessManager};

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub process_manager: Arc<ProcessManager>,
    pub decision_service: Arc<DecisionService>,
}

impl AppState {
    pub fn new(process_manager: Arc<ProcessManager>, decision_service: Arc<DecisionService>) -> Self {
        Self {
            process_manager,
            decision_service,
        }
    }
}
