//! Process lifecycle errors

use std::fmt;

/// Errors raised when a process record is mutated out of order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Malformed process ID
    InvalidId(String),

    /// Status change that would move a record backwards or skip a step
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Stored record breaks the result/error/status pairing
    Inconsistent(String),
}

impl ProcessError {
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId(message.into())
    }

    pub fn invalid_transition(from: &str, to: &str, reason: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent(message.into())
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(msg) => write!(f, "Invalid process ID: {}", msg),
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid state transition from '{}' to '{}': {}",
                    from, to, reason
                )
            }
            Self::Inconsistent(msg) => write!(f, "Inconsistent process record: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}

impl From<ProcessError> for crate::domain::DomainError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::InvalidId(msg) => Self::invalid_id(msg),
            ProcessError::InvalidStateTransition { .. } => Self::conflict(err.to_string()),
            ProcessError::Inconsistent(_) => Self::storage(err.to_string()),
        }
    }
}
