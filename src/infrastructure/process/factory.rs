//! Process repository factory for runtime backend selection

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::error::DomainError;
use crate::domain::process::ProcessRepository;

use super::in_memory_repository::InMemoryProcessRepository;
use super::redis_repository::{RedisProcessRepository, RedisProcessRepositoryConfig};

impl From<&StorageConfig> for RedisProcessRepositoryConfig {
    fn from(config: &StorageConfig) -> Self {
        RedisProcessRepositoryConfig::new(config.redis_url.clone())
            .with_key_prefix(config.key_prefix.clone())
            .with_retention(Duration::from_secs(config.retention_days.saturating_mul(24 * 3600)))
            .with_connection_timeout(Duration::from_secs(config.connection_timeout_secs))
    }
}

/// Build the configured process store
///
/// When Redis is selected but unreachable, the in-memory store is used instead
/// if `fallback_to_memory` is set; otherwise the connection error is returned.
pub async fn build_process_repository(
    config: &StorageConfig,
) -> Result<Arc<dyn ProcessRepository>, DomainError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory process storage");
            Ok(Arc::new(InMemoryProcessRepository::new()))
        }
        StorageBackend::Redis => match RedisProcessRepository::new(config.into()).await {
            Ok(repo) => {
                info!(key_prefix = %config.key_prefix, "Using Redis process storage");
                Ok(Arc::new(repo))
            }
            Err(e) if config.fallback_to_memory => {
                warn!(
                    error = %e,
                    "Redis unavailable, falling back to in-memory process storage"
                );
                Ok(Arc::new(InMemoryProcessRepository::new()))
            }
            Err(e) => Err(e),
        },
    }
}
