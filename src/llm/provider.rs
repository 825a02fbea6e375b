use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Configuration for an LLM provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub base_url: Option<String>,
}

/// Completion client shared by every stage of a run.
///
/// Wraps a provider adapter with the per-call timeout and cancellation
/// checks the pipeline relies on.
#[derive(Clone)]
pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    provider_name: String,
    timeout: Duration,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig, timeout: Duration) -> AppResult<Self> {
        let adapter: Arc<dyn LLMAdapter> = match provider.name.as_str() {
            "openai" | "openrouter" | "groq" | "glm" => {
                let base_url = provider
                    .base_url
                    .clone()
                    .or_else(|| crate::llm::openai::default_base_url(&provider.name).map(String::from))
                    .ok_or_else(|| {
                        AppError::Config(format!("No base URL for provider {}", provider.name))
                    })?;
                Arc::new(crate::llm::openai::OpenAICompatibleAdapter::new(
                    &provider.api_key,
                    base_url,
                ))
            }
            other => {
                return Err(AppError::Config(format!("Unsupported provider: {}", other)));
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
            timeout,
        })
    }

    /// Build a client around an already constructed adapter
    pub fn with_adapter(
        adapter: Arc<dyn LLMAdapter>,
        provider_name: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            adapter,
            provider_name: provider_name.into(),
            timeout,
        }
    }

    /// Run one completion. Cancellation aborts the call, and an expired
    /// timeout is a completion failure.
    pub async fn complete(
        &self,
        request: &LLMRequest,
        cancel: &CancellationToken,
    ) -> AppResult<LLMResponse> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        debug!(
            provider = %self.provider_name,
            model = %request.model,
            temperature = ?request.temperature,
            "Sending completion request"
        );

        let call = tokio::time::timeout(self.timeout, self.adapter.create_chat_completion(request));
        tokio::select! {
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            outcome = call => match outcome {
                Ok(result) => result,
                Err(_) => Err(AppError::Completion(format!(
                    "{} completion timed out after {}s",
                    self.provider_name,
                    self.timeout.as_secs_f64()
                ))),
            },
        }
    }
}
