//! Decision Flow
//!
//! Evaluator-guided decision workflow with:
//! - A fixed ten-stage graph where every stage is checked by a paired evaluator
//! - A bounded information augmentation loop before the draft is updated
//! - Background process tracking backed by memory or Redis
//! - An HTTP API and a command line front end

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::workflow::TransitionPolicy;
use domain::DomainError;
use infrastructure::{
    llm::LlmProviderFactory,
    process::build_process_repository,
    services::{DecisionService, ProcessManager},
    workflow::{DecisionEngine, FileTransitionLog},
};
use tracing::info;

/// Build the workflow engine from configuration
pub fn create_decision_engine(config: &AppConfig) -> Result<Arc<DecisionEngine>, DomainError> {
    let reasoning = LlmProviderFactory::create_reasoning_service(&config.llm)?;

    let mut engine = DecisionEngine::new(reasoning).with_policy(TransitionPolicy {
        max_information_augmentations: config.workflow.max_information_augmentations,
    });

    if let Some(dir) = &config.workflow.transition_log_dir {
        info!(dir = %dir, "Writing transition history to disk");
        engine = engine.with_transition_log(Arc::new(FileTransitionLog::new(dir)));
    }

    Ok(Arc::new(engine))
}

/// Create the application state with all services initialized
pub async fn create_app_state_with_config(config: &AppConfig) -> Result<AppState, DomainError> {
    let engine = create_decision_engine(config)?;
    let repository = build_process_repository(&config.storage).await?;

    info!(
        storage = repository.backend_name(),
        model = %config.llm.model,
        evaluation_model = %config.llm.evaluation_model,
        max_information_augmentations = config.workflow.max_information_augmentations,
        "Application state initialized"
    );

    let process_manager = Arc::new(ProcessManager::new(repository, engine.clone()));
    let decision_service = Arc::new(DecisionService::new(engine));

    Ok(AppState::new(process_manager, decision_service))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.api_key = "sk-test".to_string();
        config
    }

    #[tokio::test]
    async fn test_create_app_state_in_memory() {
        let state = create_app_state_with_config(&config_with_key()).await.unwrap();
        assert_eq!(state.process_manager.backend_name(), "memory");
    }

    #[test]
    fn test_engine_uses_configured_policy() {
        let mut config = config_with_key();
        config.workflow.max_information_augmentations = 5;

        let engine = create_decision_engine(&config).unwrap();
        assert_eq!(engine.policy().max_information_augmentations, 5);
    }
}
