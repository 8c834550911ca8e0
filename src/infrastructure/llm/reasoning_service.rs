//! Reasoning service backed by a chat-completions provider

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::decision::{Evaluation, ResultOutput};
use crate::domain::llm::{LlmProvider, LlmRequest, LlmResponseFormat};
use crate::domain::reasoning::{AgentRole, EvaluationContext, ReasoningService};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_reasoning_call;

fn evaluation_format() -> LlmResponseFormat {
    LlmResponseFormat::json_schema(
        "evaluation",
        serde_json::json!({
            "type": "object",
            "properties": {
                "correct": {
                    "type": "boolean",
                    "description": "Whether the answer is acceptable"
                },
                "comment": {
                    "type": "string",
                    "description": "Justification of the verdict, at least 10 characters"
                }
            },
            "required": ["correct", "comment"],
            "additionalProperties": false
        }),
    )
}

fn result_format() -> LlmResponseFormat {
    LlmResponseFormat::json_schema(
        "result_output",
        serde_json::json!({
            "type": "object",
            "properties": {
                "result": {
                    "type": "string",
                    "description": "The selected option for the decision"
                },
                "result_comment": {
                    "type": "string",
                    "description": "Comment on the selection of the result"
                },
                "best_alternative_result": {
                    "type": "string",
                    "description": "The best alternative option for the decision"
                },
                "best_alternative_result_comment": {
                    "type": "string",
                    "description": "Comment on the selection of the best alternative to result"
                }
            },
            "required": [
                "result",
                "result_comment",
                "best_alternative_result",
                "best_alternative_result_comment"
            ],
            "additionalProperties": false
        }),
    )
}

/// `ReasoningService` that prompts an LLM with one system instruction per role
#[derive(Debug, Clone)]
pub struct LlmReasoningService {
    provider: Arc<dyn LlmProvider>,
    model: String,
    evaluation_model: String,
    temperature: Option<f32>,
}

impl LlmReasoningService {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            provider,
            evaluation_model: model.clone(),
            model,
            temperature: None,
        }
    }

    /// Use a different model for verdicts
    pub fn with_evaluation_model(mut self, model: impl Into<String>) -> Self {
        self.evaluation_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn request(
        &self,
        system: &str,
        prompt: &str,
        format: Option<LlmResponseFormat>,
    ) -> LlmRequest {
        let mut builder = LlmRequest::builder().system(system).user(prompt);
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(format) = format {
            builder = builder.response_format(format);
        }
        builder.build()
    }

    async fn complete(
        &self,
        role: AgentRole,
        call: &'static str,
        model: &str,
        request: LlmRequest,
    ) -> Result<String, DomainError> {
        let start = Instant::now();
        let result = self.provider.chat(model, request).await;
        record_reasoning_call(role, call, result.is_ok(), start.elapsed());

        let response = result?;
        if response.is_truncated() {
            warn!(role = role.name(), call, "Model output was truncated");
        }

        debug!(
            role = role.name(),
            call,
            model = %model,
            duration_ms = start.elapsed().as_millis() as u64,
            "Reasoning call completed"
        );

        Ok(response.content().to_string())
    }

    fn parse_structured<T: DeserializeOwned>(
        &self,
        role: AgentRole,
        raw: &str,
    ) -> Result<T, DomainError> {
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
            DomainError::provider(
                self.provider.provider_name(),
                format!("Malformed output from {}: {}", role.name(), e),
            )
        })
    }
}

/// Some models wrap JSON in a markdown fence even in structured mode
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[async_trait]
impl ReasoningService for LlmReasoningService {
    async fn generate(&self, role: AgentRole, prompt: &str) -> Result<String, DomainError> {
        let request = self.request(role.instructions(), prompt, None);
        let content = self.complete(role, "generate", &self.model, request).await?;

        if content.trim().is_empty() {
            return Err(DomainError::provider(
                self.provider.provider_name(),
                format!("Empty answer from {}", role.name()),
            ));
        }

        Ok(content)
    }

    async fn decide(&self, prompt: &str) -> Result<ResultOutput, DomainError> {
        let role = AgentRole::Result;
        let request = self.request(role.instructions(), prompt, Some(result_format()));
        let content = self.complete(role, "decide", &self.model, request).await?;

        self.parse_structured(role, &content)
    }

    async fn evaluate(
        &self,
        role: AgentRole,
        context: &EvaluationContext,
    ) -> Result<Evaluation, DomainError> {
        let instructions = role.evaluator_instructions();
        let request = self.request(&instructions, &context.to_xml(), Some(evaluation_format()));
        let content = self
            .complete(role, "evaluate", &self.evaluation_model, request)
            .await?;

        let evaluation: Evaluation = self.parse_structured(role, &content)?;
        evaluation.validate().map_err(|e| {
            DomainError::provider(
                self.provider.provider_name(),
                format!("Malformed verdict from {}: {}", role.evaluator_name(), e),
            )
        })?;

        Ok(evaluation)
    }
}
