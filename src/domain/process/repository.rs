//! Process repository trait

use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{ProcessId, ProcessRecord, ProcessStats};
use crate::domain::error::DomainError;

/// Storage contract shared by every process backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessRepository: Send + Sync + Debug {
    /// Insert or replace a record
    async fn save(&self, record: &ProcessRecord) -> Result<(), DomainError>;

    /// Get a record by ID
    async fn get(&self, id: &ProcessId) -> Result<Option<ProcessRecord>, DomainError>;

    /// Whether a record with this ID is stored
    async fn exists(&self, id: &ProcessId) -> Result<bool, DomainError>;

    /// Delete a record; `false` when it was absent
    async fn delete(&self, id: &ProcessId) -> Result<bool, DomainError>;

    /// List every stored record
    async fn list_all(&self) -> Result<Vec<ProcessRecord>, DomainError>;

    /// Count records per status
    async fn get_stats(&self) -> Result<ProcessStats, DomainError>;

    /// Remove completed/failed records whose completion is older than the threshold
    async fn cleanup_completed(&self, older_than_hours: u64) -> Result<usize, DomainError>;

    /// Name of the backend, used in logs and health checks
    fn backend_name(&self) -> &'static str;
}
