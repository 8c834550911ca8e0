//! LLM provider and reasoning service implementations

mod factory;
mod http_client;
mod openai;
mod reasoning_service;

pub use factory::LlmProviderFactory;
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL};
pub use reasoning_service::LlmReasoningService;
