//! Process domain entities

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ProcessError;
use crate::domain::decision::DecisionState;

/// Prefix shared by every generated process ID
pub const PROCESS_ID_PREFIX: &str = "process_";

/// Regex pattern for valid process IDs: process_{12 hex chars}
static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^process_[a-f0-9]{12}$").unwrap());

/// Completion instant before which terminal records count as older than
/// `older_than_hours`; `None` when no representable instant is that old
pub fn cleanup_cutoff(older_than_hours: u64) -> Option<DateTime<Utc>> {
    i64::try_from(older_than_hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .and_then(|age| Utc::now().checked_sub_signed(age))
}

/// Validated process identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProcessId(String);

impl ProcessId {
    /// Create a new validated process ID
    pub fn new(id: impl Into<String>) -> Result<Self, ProcessError> {
        let id = id.into();
        validate_process_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh process ID from a random UUID
    pub fn generate() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", PROCESS_ID_PREFIX, &hex[..12]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProcessId {
    type Error = ProcessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProcessId> for String {
    fn from(id: ProcessId) -> Self {
        id.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProcessId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a process ID string
pub fn validate_process_id(id: &str) -> Result<(), ProcessError> {
    if id.is_empty() {
        return Err(ProcessError::invalid_id("Process ID cannot be empty"));
    }

    if !ID_PATTERN.is_match(id) {
        return Err(ProcessError::invalid_id(format!(
            "Invalid process ID '{}': must be in format process_{{12 hex chars}}",
            id
        )));
    }

    Ok(())
}

/// Lifecycle status of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 4] = [
        Self::Pending,
        Self::Running,
        Self::Completed,
        Self::Failed,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Forward-only: pending -> running -> completed | failed
    pub fn can_transition_to(&self, target: ProcessStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProcessStatus {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(ProcessError::inconsistent(format!(
                "unknown status '{}'",
                other
            ))),
        }
    }
}

/// Externally observable envelope of one workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    process_id: ProcessId,

    /// Original request text
    query: String,

    status: ProcessStatus,

    /// Final decision state, present only once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<DecisionState>,

    /// Error text, present only once failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,

    /// Set on completed or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl ProcessRecord {
    /// Create a pending record with a fresh ID
    pub fn new(query: impl Into<String>) -> Self {
        Self::with_id(ProcessId::generate(), query)
    }

    pub fn with_id(process_id: ProcessId, query: impl Into<String>) -> Self {
        Self {
            process_id,
            query: query.into(),
            status: ProcessStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn process_id(&self) -> &ProcessId {
        &self.process_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    pub fn result(&self) -> Option<&DecisionState> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Completed or failed before the given instant
    pub fn finished_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.is_terminal() && self.completed_at.is_some_and(|at| at < cutoff)
    }

    pub fn mark_running(&mut self) -> Result<(), ProcessError> {
        self.transition(ProcessStatus::Running, "Process is not in pending state")?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_completed(&mut self, result: DecisionState) -> Result<(), ProcessError> {
        self.transition(ProcessStatus::Completed, "Process is not in running state")?;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), ProcessError> {
        self.transition(ProcessStatus::Failed, "Process is not in running state")?;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, target: ProcessStatus, reason: &str) -> Result<(), ProcessError> {
        if !self.status.can_transition_to(target) {
            return Err(ProcessError::invalid_transition(
                self.status.as_str(),
                target.as_str(),
                reason,
            ));
        }
        self.status = target;
        Ok(())
    }

    /// Check the status/result/error/completed_at pairing of a loaded record
    pub fn validate(&self) -> Result<(), ProcessError> {
        let completed = self.status == ProcessStatus::Completed;
        let failed = self.status == ProcessStatus::Failed;

        if completed != self.result.is_some() {
            return Err(ProcessError::inconsistent(format!(
                "{} has status '{}' but result is {}",
                self.process_id,
                self.status,
                if self.result.is_some() { "set" } else { "missing" }
            )));
        }

        if failed != self.error.is_some() {
            return Err(ProcessError::inconsistent(format!(
                "{} has status '{}' but error is {}",
                self.process_id,
                self.status,
                if self.error.is_some() { "set" } else { "missing" }
            )));
        }

        if self.is_terminal() != self.completed_at.is_some() {
            return Err(ProcessError::inconsistent(format!(
                "{} has status '{}' but completed_at is {}",
                self.process_id,
                self.status,
                if self.completed_at.is_some() { "set" } else { "missing" }
            )));
        }

        Ok(())
    }

    /// Shift every timestamp into the past
    #[cfg(test)]
    pub fn backdate(&mut self, by: chrono::Duration) {
        self.created_at -= by;
        self.started_at = self.started_at.map(|at| at - by);
        self.completed_at = self.completed_at.map(|at| at - by);
    }
}

/// Record counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

impl ProcessStats {
    pub fn record(&mut self, status: ProcessStatus) {
        self.total += 1;
        match status {
            ProcessStatus::Pending => self.pending += 1,
            ProcessStatus::Running => self.running += 1,
            ProcessStatus::Completed => self.completed += 1,
            ProcessStatus::Failed => self.failed += 1,
        }
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ProcessRecord>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.record(record.status());
        }
        stats
    }
}
