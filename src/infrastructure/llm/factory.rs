use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::{LlmReasoningService, OpenAiProvider};
use crate::config::LlmConfig;
use crate::domain::{DomainError, LlmProvider, ReasoningService};

/// Factory for the LLM-backed reasoning stack
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the chat-completions provider from configuration
    pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            DomainError::configuration(
                "No LLM API key configured; set APP_LLM__API_KEY or OPENAI_API_KEY",
            )
        })?;

        let http_client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;
        Ok(Arc::new(OpenAiProvider::with_base_url(
            http_client,
            api_key,
            config.base_url.clone(),
        )))
    }

    /// Create the reasoning service the workflow engine consumes
    pub fn create_reasoning_service(
        config: &LlmConfig,
    ) -> Result<Arc<dyn ReasoningService>, DomainError> {
        let provider = Self::create_provider(config)?;
        let mut service = LlmReasoningService::new(provider, config.model.clone())
            .with_evaluation_model(config.evaluation_model.clone());

        if let Some(temperature) = config.temperature {
            service = service.with_temperature(temperature);
        }

        Ok(Arc::new(service))
    }
}
