use serde::Deserialize;

use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub workflow: WorkflowConfig,
    pub processes: ProcessConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Falls back to `OPENAI_API_KEY` when empty
    pub api_key: String,
    /// Model used by drafting and retrieval agents
    pub model: String,
    /// Model used by evaluators
    pub evaluation_model: String,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Redis,
}

/// Process record storage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub redis_url: String,
    pub key_prefix: String,
    /// TTL applied to completed and failed records
    pub retention_days: u64,
    pub connection_timeout_secs: u64,
    /// Use the in-memory backend when Redis cannot be reached at startup
    pub fallback_to_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub max_information_augmentations: u32,
    /// Directory for per-run transition history files; disabled when unset
    pub transition_log_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Seconds between background cleanup sweeps; 0 disables the sweeper
    pub cleanup_interval_secs: u64,
    pub retention_hours: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4.1-mini".to_string(),
            evaluation_model: "gpt-4.1-mini".to_string(),
            timeout_secs: 300,
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// Configured key, or the `OPENAI_API_KEY` environment variable
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            redis_url: "redis://localhost:6379/0".to_string(),
            key_prefix: "process:".to_string(),
            retention_days: 7,
            connection_timeout_secs: 5,
            fallback_to_memory: true,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_information_augmentations: crate::domain::workflow::DEFAULT_MAX_INFORMATION_AUGMENTATIONS,
            transition_log_dir: None,
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: 3600,
            retention_hours: 24,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.key_prefix, "process:");
        assert_eq!(config.storage.retention_days, 7);
        assert_eq!(config.workflow.max_information_augmentations, 3);
        assert_eq!(config.processes.retention_hours, 24);
        assert_eq!(config.llm.timeout_secs, 300);
    }

    #[test]
    fn test_partial_sources_keep_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("storage.backend", "redis")
            .unwrap()
            .set_override("llm.model", "gpt-4.1")
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Redis);
        assert_eq!(config.storage.redis_url, "redis://localhost:6379/0");
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.llm.evaluation_model, "gpt-4.1-mini");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_configured_api_key_wins() {
        let config = LlmConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("sk-test"));
    }
}
