//! Decision domain: the accumulator threaded through one workflow run

mod evaluation;
mod state;
mod validation;

pub use evaluation::{Evaluation, MIN_COMMENT_LENGTH};
pub use state::{DecisionField, DecisionState, ResultOutput};
pub use validation::{validate_decision_query, MAX_QUERY_LENGTH, MIN_QUERY_LENGTH};
