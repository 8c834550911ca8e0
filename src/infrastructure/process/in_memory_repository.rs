//! In-memory process repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::process::{
    cleanup_cutoff, ProcessId, ProcessRecord, ProcessRepository, ProcessStats,
};

/// Single-instance process store; contents are lost on restart
#[derive(Debug, Clone, Default)]
pub struct InMemoryProcessRepository {
    records: Arc<RwLock<HashMap<ProcessId, ProcessRecord>>>,
}

impl InMemoryProcessRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessRepository for InMemoryProcessRepository {
    async fn save(&self, record: &ProcessRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        records.insert(record.process_id().clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &ProcessId) -> Result<Option<ProcessRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn exists(&self, id: &ProcessId) -> Result<bool, DomainError> {
        let records = self.records.read().await;
        Ok(records.contains_key(id))
    }

    async fn delete(&self, id: &ProcessId) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        Ok(records.remove(id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<ProcessRecord>, DomainError> {
        let records = self.records.read().await;
        let mut all: Vec<ProcessRecord> = records.values().cloned().collect();
        all.sort_by_key(|r| r.created_at());
        Ok(all)
    }

    async fn get_stats(&self) -> Result<ProcessStats, DomainError> {
        let records = self.records.read().await;
        Ok(ProcessStats::from_records(records.values()))
    }

    async fn cleanup_completed(&self, older_than_hours: u64) -> Result<usize, DomainError> {
        let Some(cutoff) = cleanup_cutoff(older_than_hours) else {
            return Ok(0);
        };
        let mut records = self.records.write().await;
        let before = records.len();

        records.retain(|_, record| !record.finished_before(cutoff));

        Ok(before - records.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
