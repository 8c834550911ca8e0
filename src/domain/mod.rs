//! Domain layer - decision workflow, process tracking and LLM seams

pub mod decision;
pub mod error;
pub mod llm;
pub mod process;
pub mod reasoning;
pub mod workflow;

pub use decision::{
    validate_decision_query, DecisionField, DecisionState, Evaluation, ResultOutput,
};
pub use error::DomainError;
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    Usage,
};
pub use process::{
    ProcessError, ProcessId, ProcessRecord, ProcessRepository, ProcessStats, ProcessStatus,
};
pub use reasoning::{AgentRole, EvaluationContext, ReasoningService};
pub use workflow::{
    Answer, DecisionExecutor, Directive, Node, RunOutcome, Stage, Transition, TransitionLog,
    TransitionPolicy, WorkflowError,
};
