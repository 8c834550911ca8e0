//! Redis process repository implementation

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::process::{
    cleanup_cutoff, ProcessId, ProcessRecord, ProcessRepository, ProcessStats,
};

const RESULT_FIELD: &str = "result";

/// Configuration for the Redis process store
#[derive(Debug, Clone)]
pub struct RedisProcessRepositoryConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379/0")
    pub url: String,
    /// Prefix applied to every key written by the repository
    pub key_prefix: String,
    /// Expiry for completed and failed records
    pub retention: Duration,
    pub connection_timeout: Duration,
}

impl Default for RedisProcessRepositoryConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/0".to_string(),
            key_prefix: "process:".to_string(),
            retention: Duration::from_secs(7 * 24 * 3600),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisProcessRepositoryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis-backed process store
///
/// Layout:
/// - `{prefix}{id}` hash with the scalar record fields
/// - `{prefix}{id}:result` JSON-encoded decision state
/// - `{prefix}all` set of every known process ID
/// - `{prefix}completed` sorted set of terminal IDs scored by completion time (ms)
///
/// Every write is a MULTI/EXEC pipeline so readers never observe half a record.
#[derive(Clone)]
pub struct RedisProcessRepository {
    connection: ConnectionManager,
    config: RedisProcessRepositoryConfig,
}

impl fmt::Debug for RedisProcessRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisProcessRepository")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisProcessRepository {
    /// Connect to Redis, failing when the server cannot be reached in time
    pub async fn new(config: RedisProcessRepositoryConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = tokio::time::timeout(config.connection_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                DomainError::storage(format!(
                    "Timed out connecting to Redis after {}s",
                    config.connection_timeout.as_secs()
                ))
            })?
            .map_err(|e| DomainError::storage(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    pub fn config(&self) -> &RedisProcessRepositoryConfig {
        &self.config
    }

    fn record_key(&self, id: &str) -> String {
        format!("{}{}", self.config.key_prefix, id)
    }

    fn result_key(&self, id: &str) -> String {
        format!("{}{}:result", self.config.key_prefix, id)
    }

    fn index_key(&self) -> String {
        format!("{}all", self.config.key_prefix)
    }

    fn completed_key(&self) -> String {
        format!("{}completed", self.config.key_prefix)
    }

    async fn remove_ids(&self, id: &str) -> Result<i64, DomainError> {
        let mut conn = self.connection.clone();
        let (deleted,): (i64,) = redis::pipe()
            .atomic()
            .del(&[self.record_key(id), self.result_key(id)])
            .srem(self.index_key(), id)
            .ignore()
            .zrem(self.completed_key(), id)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(deleted)
    }
}

/// Upper bound on EXPIRE seconds; larger values overflow Redis' millisecond clock
const MAX_TTL_SECS: i64 = i32::MAX as i64;

/// EXPIRE argument for terminal records; a zero retention keeps them until cleanup
pub(crate) fn retention_ttl_secs(retention: Duration) -> Option<i64> {
    match retention.as_secs() {
        0 => None,
        secs => Some(i64::try_from(secs).unwrap_or(i64::MAX).min(MAX_TTL_SECS)),
    }
}

/// Split a record into hash fields and the separately stored result JSON
pub(crate) fn to_fields(
    record: &ProcessRecord,
) -> Result<(Vec<(String, String)>, Option<String>), DomainError> {
    let Value::Object(mut object) = serde_json::to_value(record)? else {
        return Err(DomainError::internal("Process record did not serialize to an object"));
    };

    let result = match object.remove(RESULT_FIELD) {
        Some(Value::Null) | None => None,
        Some(value) => Some(serde_json::to_string(&value)?),
    };

    let fields = object
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect();

    Ok((fields, result))
}

/// Rebuild a record from its hash fields and result JSON, rejecting inconsistent data
pub(crate) fn from_fields(
    fields: HashMap<String, String>,
    result: Option<String>,
) -> Result<ProcessRecord, DomainError> {
    let mut object: Map<String, Value> = fields
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    if let Some(raw) = result {
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| DomainError::storage(format!("Corrupt stored result: {}", e)))?;
        object.insert(RESULT_FIELD.to_string(), value);
    }

    let record: ProcessRecord = serde_json::from_value(Value::Object(object))
        .map_err(|e| DomainError::storage(format!("Corrupt stored process record: {}", e)))?;
    record.validate()?;

    Ok(record)
}

#[async_trait]
impl ProcessRepository for RedisProcessRepository {
    async fn save(&self, record: &ProcessRecord) -> Result<(), DomainError> {
        let id = record.process_id().as_str();
        let record_key = self.record_key(id);
        let result_key = self.result_key(id);
        let (fields, result) = to_fields(record)?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(&record_key)
            .ignore()
            .hset_multiple(&record_key, &fields)
            .ignore()
            .sadd(self.index_key(), id)
            .ignore();

        match result {
            Some(json) => pipe.set(&result_key, json).ignore(),
            None => pipe.del(&result_key).ignore(),
        };

        match record.completed_at().filter(|_| record.is_terminal()) {
            Some(completed_at) => {
                pipe.zadd(self.completed_key(), id, completed_at.timestamp_millis())
                    .ignore();
                if let Some(ttl) = retention_ttl_secs(self.config.retention) {
                    pipe.expire(&record_key, ttl)
                        .ignore()
                        .expire(&result_key, ttl)
                        .ignore();
                }
            }
            None => {
                pipe.zrem(self.completed_key(), id).ignore();
            }
        }

        let mut conn = self.connection.clone();
        pipe.query_async::<()>(&mut conn).await?;

        debug!(process_id = %id, status = %record.status(), "Saved process record to Redis");
        Ok(())
    }

    async fn get(&self, id: &ProcessId) -> Result<Option<ProcessRecord>, DomainError> {
        let mut conn = self.connection.clone();
        // MULTI/EXEC so the hash and the result key come from the same write
        let (fields, result): (HashMap<String, String>, Option<String>) = redis::pipe()
            .atomic()
            .hgetall(self.record_key(id.as_str()))
            .get(self.result_key(id.as_str()))
            .query_async(&mut conn)
            .await?;

        if fields.is_empty() {
            return Ok(None);
        }

        from_fields(fields, result).map(Some)
    }

    async fn exists(&self, id: &ProcessId) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(self.record_key(id.as_str())).await?;
        Ok(exists)
    }

    async fn delete(&self, id: &ProcessId) -> Result<bool, DomainError> {
        let deleted = self.remove_ids(id.as_str()).await?;
        Ok(deleted > 0)
    }

    async fn list_all(&self) -> Result<Vec<ProcessRecord>, DomainError> {
        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn.smembers(self.index_key()).await?;

        let ids: Vec<ProcessId> = ids
            .into_iter()
            .filter_map(|raw| match ProcessId::new(raw.clone()) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(process_id = %raw, error = %e, "Skipping malformed process ID in index");
                    None
                }
            })
            .collect();

        let fetched = try_join_all(ids.iter().map(|id| self.get(id))).await?;

        let mut records = Vec::with_capacity(fetched.len());
        for (id, record) in ids.iter().zip(fetched) {
            match record {
                Some(record) => records.push(record),
                None => {
                    // Expired by TTL; drop the stale index entries
                    self.remove_ids(id.as_str()).await?;
                }
            }
        }

        records.sort_by_key(|r| r.created_at());
        Ok(records)
    }

    async fn get_stats(&self) -> Result<ProcessStats, DomainError> {
        let records = self.list_all().await?;
        Ok(ProcessStats::from_records(&records))
    }

    async fn cleanup_completed(&self, older_than_hours: u64) -> Result<usize, DomainError> {
        let Some(cutoff) = cleanup_cutoff(older_than_hours) else {
            return Ok(0);
        };
        let mut conn = self.connection.clone();
        let candidates: Vec<String> = conn
            .zrangebyscore(self.completed_key(), "-inf", cutoff.timestamp_millis())
            .await?;

        let mut removed = 0;
        for raw in candidates {
            let Ok(id) = ProcessId::new(raw.clone()) else {
                self.remove_ids(&raw).await?;
                continue;
            };

            match self.get(&id).await? {
                Some(record) if record.finished_before(cutoff) => {
                    if self.remove_ids(id.as_str()).await? > 0 {
                        removed += 1;
                    }
                }
                Some(_) => {}
                None => {
                    self.remove_ids(id.as_str()).await?;
                }
            }
        }

        debug!(removed, older_than_hours, "Cleaned up Redis process records");
        Ok(removed)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::repository::tests as contract;
    use crate::domain::process::ProcessStatus;

    // Note: the ignored tests require a running Redis instance
    // Run with: cargo test -- --ignored

    async fn create_repo() -> RedisProcessRepository {
        let prefix = format!("test:{}:", uuid::Uuid::new_v4().simple());
        let config = RedisProcessRepositoryConfig::new("redis://127.0.0.1:6379/0")
            .with_key_prefix(prefix);
        RedisProcessRepository::new(config).await.unwrap()
    }

    fn as_map(fields: Vec<(String, String)>) -> HashMap<String, String> {
        fields.into_iter().collect()
    }

    #[test]
    fn test_config_builder() {
        let config = RedisProcessRepositoryConfig::new("redis://cache:6379/2")
            .with_key_prefix("decisions:")
            .with_retention(Duration::from_secs(3600))
            .with_connection_timeout(Duration::from_secs(1));

        assert_eq!(config.url, "redis://cache:6379/2");
        assert_eq!(config.key_prefix, "decisions:");
        assert_eq!(config.retention, Duration::from_secs(3600));
        assert_eq!(config.connection_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_retention_ttl() {
        assert_eq!(retention_ttl_secs(Duration::from_secs(3600)), Some(3600));
        assert_eq!(retention_ttl_secs(Duration::ZERO), None);
        assert_eq!(retention_ttl_secs(Duration::from_millis(500)), None);
        assert_eq!(retention_ttl_secs(Duration::from_secs(u64::MAX)), Some(MAX_TTL_SECS));
    }

    #[test]
    fn test_pending_record_fields() {
        let record = contract::create_test_record();
        let (fields, result) = to_fields(&record).unwrap();
        let fields = as_map(fields);

        assert!(result.is_none());
        assert_eq!(fields.get("status").map(String::as_str), Some("pending"));
        assert_eq!(
            fields.get("process_id").map(String::as_str),
            Some(record.process_id().as_str())
        );
        assert!(!fields.contains_key("error"));
        assert!(!fields.contains_key("completed_at"));

        let restored = from_fields(fields, result).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_completed_record_fields() {
        let record = contract::create_completed_record();
        let (fields, result) = to_fields(&record).unwrap();

        assert!(result.as_deref().is_some_and(|r| r.contains("Modular monolith")));
        assert!(!as_map(fields.clone()).contains_key(RESULT_FIELD));

        let restored = from_fields(as_map(fields), result).unwrap();
        assert_eq!(restored, record);
        assert_eq!(restored.status(), ProcessStatus::Completed);
    }

    #[test]
    fn test_failed_record_fields() {
        let record = contract::create_failed_record();
        let (fields, result) = to_fields(&record).unwrap();

        assert!(result.is_none());
        let restored = from_fields(as_map(fields), result).unwrap();
        assert_eq!(restored.error(), record.error());
    }

    #[test]
    fn test_completed_without_result_is_rejected() {
        let record = contract::create_completed_record();
        let (fields, _) = to_fields(&record).unwrap();

        let err = from_fields(as_map(fields), None).unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_corrupt_fields_are_rejected() {
        let record = contract::create_test_record();
        let (fields, _) = to_fields(&record).unwrap();
        let mut fields = as_map(fields);
        fields.insert("status".to_string(), "archived".to_string());

        let err = from_fields(fields, None).unwrap_err();
        assert!(err.is_storage());

        let record = contract::create_completed_record();
        let (fields, _) = to_fields(&record).unwrap();
        let err = from_fields(as_map(fields), Some("{not json".to_string())).unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails() {
        let config = RedisProcessRepositoryConfig::new("redis://127.0.0.1:1/0")
            .with_connection_timeout(Duration::from_millis(500));

        let err = RedisProcessRepository::new(config).await.unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_basic_crud() {
        let repo = create_repo().await;
        contract::test_repository_basic_crud(&repo).await;
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_delete_missing() {
        let repo = create_repo().await;
        contract::test_repository_delete_missing(&repo).await;
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_save_is_upsert() {
        let repo = create_repo().await;
        contract::test_repository_save_is_upsert(&repo).await;
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_terminal_round_trip() {
        let repo = create_repo().await;
        contract::test_repository_terminal_round_trip(&repo).await;
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_list_and_stats() {
        let repo = create_repo().await;
        contract::test_repository_list_and_stats(&repo).await;
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_cleanup_completed() {
        let repo = create_repo().await;
        contract::test_repository_cleanup_completed(&repo).await;
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_cleanup_out_of_range_hours() {
        let repo = create_repo().await;
        contract::test_repository_cleanup_out_of_range_hours(&repo).await;
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_get_never_mixes_concurrent_writes() {
        let repo = create_repo().await;

        let mut running = contract::create_test_record();
        running.mark_running().unwrap();
        let mut completed = running.clone();
        completed.mark_completed(contract::completed_state()).unwrap();
        let id = running.process_id().clone();
        repo.save(&running).await.unwrap();

        let writer = {
            let repo = repo.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    repo.save(&completed).await.unwrap();
                    repo.save(&running).await.unwrap();
                }
            })
        };

        for _ in 0..400 {
            let record = repo.get(&id).await;
            assert!(record.is_ok(), "read a torn record: {:?}", record.err());
        }

        writer.await.unwrap();
    }
}
