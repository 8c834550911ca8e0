//! Workflow infrastructure implementations

mod executor_impl;
mod transition_log;

pub use executor_impl::DecisionEngine;
pub use transition_log::{FileTransitionLog, InMemoryTransitionLog};
