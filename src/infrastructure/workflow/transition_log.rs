//! Transition history sinks

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::domain::workflow::TransitionLog;
use crate::domain::DomainError;

/// In-memory history, kept for the life of the process
#[derive(Debug, Default)]
pub struct InMemoryTransitionLog {
    runs: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl InMemoryTransitionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransitionLog for InMemoryTransitionLog {
    async fn append(&self, run_id: &str, node: &str) -> Result<(), DomainError> {
        let mut runs = self.runs.write().await;
        runs.entry(run_id.to_string())
            .or_default()
            .push(node.to_string());
        Ok(())
    }

    async fn history(&self, run_id: &str) -> Result<Vec<String>, DomainError> {
        let runs = self.runs.read().await;
        Ok(runs.get(run_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryLine {
    node: String,
    at: DateTime<Utc>,
}

/// One JSON-lines file per run under a directory
#[derive(Debug, Clone)]
pub struct FileTransitionLog {
    dir: PathBuf,
}

impl FileTransitionLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, run_id: &str) -> Result<PathBuf, DomainError> {
        let valid = !run_id.is_empty()
            && run_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !valid {
            return Err(DomainError::validation(format!(
                "Run ID '{}' is not usable as a file name",
                run_id
            )));
        }

        Ok(self.dir.join(format!("{}.jsonl", run_id)))
    }
}

#[async_trait]
impl TransitionLog for FileTransitionLog {
    async fn append(&self, run_id: &str, node: &str) -> Result<(), DomainError> {
        let path = self.path_for(run_id)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create history dir: {}", e)))?;

        let mut line = serde_json::to_string(&HistoryLine {
            node: node.to_string(),
            at: Utc::now(),
        })?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to open {}: {}", path.display(), e)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write {}: {}", path.display(), e)))
    }

    async fn history(&self, run_id: &str) -> Result<Vec<String>, DomainError> {
        let path = self.path_for(run_id)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<HistoryLine>(line)
                    .map(|entry| entry.node)
                    .map_err(DomainError::from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_history_is_per_run() {
        let log = InMemoryTransitionLog::new();
        log.append("run-a", "capture_query").await.unwrap();
        log.append("run-b", "capture_query").await.unwrap();
        log.append("run-a", "identify_trigger").await.unwrap();

        assert_eq!(
            log.history("run-a").await.unwrap(),
            vec!["capture_query", "identify_trigger"]
        );
        assert_eq!(log.history("run-b").await.unwrap().len(), 1);
        assert!(log.history("run-c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_history_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileTransitionLog::new(dir.path().join("history"));

        log.append("process_0123456789ab", "capture_query").await.unwrap();
        log.append("process_0123456789ab", "identify_trigger").await.unwrap();
        log.append("process_0123456789ab", "evaluate_identify_trigger")
            .await
            .unwrap();

        let history = log.history("process_0123456789ab").await.unwrap();
        assert_eq!(
            history,
            vec!["capture_query", "identify_trigger", "evaluate_identify_trigger"]
        );

        let raw = std::fs::read_to_string(
            dir.path().join("history").join("process_0123456789ab.jsonl"),
        )
        .unwrap();
        assert_eq!(raw.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_file_history_missing_run_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileTransitionLog::new(dir.path());
        assert!(log.history("never-ran").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_history_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileTransitionLog::new(dir.path());
        assert!(log.append("../escape", "capture_query").await.is_err());
        assert!(log.history("").await.is_err());
    }
}
