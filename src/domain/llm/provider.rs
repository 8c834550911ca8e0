use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Chat-completion backend
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::domain::llm::Message;

    /// Provider that replays queued replies and records every request
    #[derive(Debug, Default)]
    pub struct MockLlmProvider {
        replies: Mutex<VecDeque<Result<String, String>>>,
        requests: Mutex<Vec<(String, LlmRequest)>>,
    }

    impl MockLlmProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_reply(self, content: impl Into<String>) -> Self {
            self.replies.lock().unwrap().push_back(Ok(content.into()));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            self.replies.lock().unwrap().push_back(Err(error.into()));
            self
        }

        pub fn requests(&self) -> Vec<(String, LlmRequest)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn chat(
            &self,
            model: &str,
            request: LlmRequest,
        ) -> Result<LlmResponse, DomainError> {
            self.requests
                .lock()
                .unwrap()
                .push((model.to_string(), request));

            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(content)) => Ok(LlmResponse::new(
                    "mock-response".to_string(),
                    model.to_string(),
                    Message::assistant(content),
                )),
                Some(Err(error)) => Err(DomainError::provider("mock", error)),
                None => Err(DomainError::provider("mock", "No mock response configured")),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
