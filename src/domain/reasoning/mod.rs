//! Reasoning service seam between the workflow and the language model

mod context;
mod role;
mod service;

pub use context::EvaluationContext;
pub use role::AgentRole;
pub use service::ReasoningService;

#[cfg(test)]
pub use service::mock::ScriptedReasoningService;
