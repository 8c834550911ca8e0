//! Decision workflow domain: stages, transition table and executor seam

mod error;
mod executor;
pub mod graph;
mod history;
pub mod prompt;
mod stage;
mod transition;

pub use error::WorkflowError;
pub use executor::{DecisionExecutor, RunOutcome};
pub use history::TransitionLog;
pub use stage::{Node, Stage};
pub use transition::{
    Answer, Directive, Transition, TransitionPolicy, DEFAULT_MAX_INFORMATION_AUGMENTATIONS,
};

#[cfg(test)]
pub use executor::MockDecisionExecutor;
