//! Decision and process API types

use serde::{Deserialize, Serialize};

use crate::domain::process::{ProcessRecord, ProcessStats};
use crate::infrastructure::services::{DecisionRunResult, DecisionSummary};

/// Request body for starting a decision run
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub decision_query: String,
}

/// Result of a synchronous run
#[derive(Debug, Clone, Serialize)]
pub struct DecisionResponse {
    #[serde(flatten)]
    pub summary: DecisionSummary,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<String>>,
}

impl DecisionResponse {
    pub fn from_run(run: &DecisionRunResult, include_history: bool) -> Self {
        Self {
            summary: run.summary(),
            execution_time_ms: run.execution_time_ms,
            history: include_history.then(|| run.history.clone()),
        }
    }
}

/// Query parameters for the synchronous run endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunQueryParams {
    #[serde(default)]
    pub include_history: bool,
}

/// Response when an async process is created (HTTP 202)
#[derive(Debug, Clone, Serialize)]
pub struct ProcessStartResponse {
    pub process_id: String,
    pub status: String,
    pub message: String,
}

impl ProcessStartResponse {
    pub fn pending(record: &ProcessRecord) -> Self {
        Self {
            process_id: record.process_id().to_string(),
            status: record.status().to_string(),
            message: "Decision process started; poll the status endpoint for the result"
                .to_string(),
        }
    }
}

/// Externally visible view of one process
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub process_id: String,
    pub query: String,
    pub status: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DecisionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ProcessRecord> for ProcessResponse {
    fn from(record: &ProcessRecord) -> Self {
        Self {
            process_id: record.process_id().to_string(),
            query: record.query().to_string(),
            status: record.status().to_string(),
            created_at: record.created_at().to_rfc3339(),
            started_at: record.started_at().map(|t| t.to_rfc3339()),
            completed_at: record.completed_at().map(|t| t.to_rfc3339()),
            result: record.result().map(DecisionSummary::from),
            error: record.error().map(String::from),
        }
    }
}

/// Response for listing processes
#[derive(Debug, Clone, Serialize)]
pub struct ProcessesListResponse {
    pub stats: ProcessStats,
    pub processes: Vec<ProcessResponse>,
}

impl ProcessesListResponse {
    pub fn new(stats: ProcessStats, records: &[ProcessRecord]) -> Self {
        Self {
            stats,
            processes: records.iter().map(ProcessResponse::from).collect(),
        }
    }
}

/// Query parameters for listing processes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessesQueryParams {
    /// Only return processes in this status
    pub status: Option<String>,
}

/// Query parameters for cleanup
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupQueryParams {
    #[serde(default = "default_cleanup_hours")]
    pub older_than_hours: u64,
}

fn default_cleanup_hours() -> u64 {
    24
}

/// Response for a cleanup sweep
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub status: String,
    pub message: String,
    pub removed: usize,
}

impl CleanupResponse {
    pub fn success(removed: usize, older_than_hours: u64) -> Self {
        Self {
            status: "success".to_string(),
            message: format!(
                "Cleaned up {} completed/failed processes older than {} hours",
                removed, older_than_hours
            ),
            removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::repository::tests::{create_completed_record, create_failed_record};

    #[test]
    fn test_completed_process_response() {
        let record = create_completed_record();
        let response = ProcessResponse::from(&record);

        assert_eq!(response.status, "completed");
        assert!(response.completed_at.is_some());
        assert!(response.error.is_none());

        let result = response.result.unwrap();
        assert_eq!(result.selected_decision, "Migrate incrementally");
        assert_eq!(result.alternative_decision, "Modular monolith");
    }

    #[test]
    fn test_failed_process_response_omits_result() {
        let record = create_failed_record();
        let json = serde_json::to_value(ProcessResponse::from(&record)).unwrap();

        assert_eq!(json["status"], "failed");
        assert!(json.get("result").is_none());
        assert!(json["error"].as_str().unwrap().contains("quota exceeded"));
    }

    #[test]
    fn test_cleanup_query_default() {
        let params: CleanupQueryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.older_than_hours, 24);
    }
}
