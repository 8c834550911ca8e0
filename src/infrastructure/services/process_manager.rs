//! Process manager: lifecycle orchestration over the decision executor and process store

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::decision::validate_decision_query;
use crate::domain::error::DomainError;
use crate::domain::process::{
    ProcessId, ProcessRecord, ProcessRepository, ProcessStats, ProcessStatus,
};
use crate::domain::workflow::DecisionExecutor;
use crate::infrastructure::observability::{record_process_created, record_process_outcome};

/// Creates process records, runs them detached and answers status queries
#[derive(Debug)]
pub struct ProcessManager {
    repository: Arc<dyn ProcessRepository>,
    executor: Arc<dyn DecisionExecutor>,
}

impl ProcessManager {
    pub fn new(repository: Arc<dyn ProcessRepository>, executor: Arc<dyn DecisionExecutor>) -> Self {
        Self {
            repository,
            executor,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }

    fn parse_id(&self, id: &str) -> Result<ProcessId, DomainError> {
        ProcessId::new(id).map_err(DomainError::from)
    }

    /// Validate the query and store a pending record
    #[instrument(skip_all)]
    pub async fn create(&self, query: &str) -> Result<ProcessRecord, DomainError> {
        let query = validate_decision_query(query)?;
        let record = ProcessRecord::new(query);

        self.repository.save(&record).await?;
        record_process_created();

        info!(
            process_id = %record.process_id(),
            backend = self.repository.backend_name(),
            "Created pending process"
        );
        Ok(record)
    }

    /// Run the workflow for a stored record and persist the terminal outcome.
    ///
    /// Returns the terminal record, or `None` when there was nothing to run
    /// (record missing, or no longer pending).
    #[instrument(skip(self, query), fields(process_id = %id))]
    pub async fn execute(
        &self,
        id: &str,
        query: Option<String>,
    ) -> Result<Option<ProcessRecord>, DomainError> {
        let process_id = self.parse_id(id)?;

        let Some(mut record) = self.repository.get(&process_id).await? else {
            debug!("Process record no longer exists, nothing to execute");
            return Ok(None);
        };

        if record.status() != ProcessStatus::Pending {
            warn!(status = %record.status(), "Process is not pending, skipping execution");
            return Ok(None);
        }

        let query = query.unwrap_or_else(|| record.query().to_string());

        record.mark_running()?;
        self.repository.save(&record).await?;
        info!("Process running");

        let start = Instant::now();
        let outcome = self.executor.execute(process_id.as_str(), &query).await;

        let Some(mut current) = self.repository.get(&process_id).await? else {
            warn!("Process record was deleted during execution, dropping outcome");
            return Ok(None);
        };

        match outcome {
            Ok(outcome) => {
                current.mark_completed(outcome.state)?;
                info!(
                    execution_time_ms = outcome.execution_time_ms,
                    nodes = outcome.history.len(),
                    "Process completed"
                );
            }
            Err(e) => {
                warn!(error = %e, "Process failed");
                current.mark_failed(e.to_string())?;
            }
        }

        if let Err(e) = self.repository.save(&current).await {
            error!(
                error = %e,
                status = %current.status(),
                "Failed to persist terminal process state"
            );
            return Err(e);
        }

        record_process_outcome(current.status(), start.elapsed());
        Ok(Some(current))
    }

    /// Schedule `execute` on the runtime without awaiting it
    pub fn spawn_execution(self: &Arc<Self>, id: &ProcessId) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let id = id.clone();

        tokio::spawn(async move {
            if let Err(e) = manager.execute(id.as_str(), None).await {
                error!(process_id = %id, error = %e, "Background process execution failed");
            }
        })
    }

    /// Periodically remove terminal records older than `retention_hours`
    pub fn spawn_periodic_cleanup(
        self: &Arc<Self>,
        interval: Duration,
        retention_hours: u64,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let interval = interval.max(Duration::from_millis(10));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match manager.cleanup_completed(retention_hours).await {
                    Ok(0) => debug!("Periodic cleanup found nothing to remove"),
                    Ok(removed) => info!(removed, retention_hours, "Periodic cleanup removed processes"),
                    Err(e) => warn!(error = %e, "Periodic cleanup failed"),
                }
            }
        })
    }

    pub async fn get(&self, id: &str) -> Result<Option<ProcessRecord>, DomainError> {
        let process_id = self.parse_id(id)?;
        self.repository.get(&process_id).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool, DomainError> {
        let process_id = self.parse_id(id)?;
        self.repository.exists(&process_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let process_id = self.parse_id(id)?;
        let deleted = self.repository.delete(&process_id).await?;
        if deleted {
            info!("Deleted process");
        }
        Ok(deleted)
    }

    pub async fn list_all(&self) -> Result<Vec<ProcessRecord>, DomainError> {
        self.repository.list_all().await
    }

    pub async fn list_by_status(
        &self,
        status: ProcessStatus,
    ) -> Result<Vec<ProcessRecord>, DomainError> {
        let mut records = self.repository.list_all().await?;
        records.retain(|r| r.status() == status);
        Ok(records)
    }

    /// Counts by status, computed by scanning every record
    pub async fn get_stats(&self) -> Result<ProcessStats, DomainError> {
        let records = self.repository.list_all().await?;
        Ok(ProcessStats::from_records(&records))
    }

    #[instrument(skip(self))]
    pub async fn cleanup_completed(&self, older_than_hours: u64) -> Result<usize, DomainError> {
        let removed = self.repository.cleanup_completed(older_than_hours).await?;
        if removed > 0 {
            info!(removed, "Cleaned up finished processes");
        }
        Ok(removed)
    }
}
