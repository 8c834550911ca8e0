//! Infrastructure services

mod decision_service;
mod process_manager;

pub use decision_service::{DecisionRunResult, DecisionService, DecisionSummary};
pub use process_manager::ProcessManager;
