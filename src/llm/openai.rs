// OpenAI-compatible chat completions adapter
// OpenAI, OpenRouter, Groq and GLM all accept the same /chat/completions payload,
// only the base URL differs.

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const GLM_API_BASE: &str = "https://api.z.ai/api/paas/v4";

pub fn default_base_url(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some(OPENAI_API_BASE),
        "openrouter" => Some(OPENROUTER_API_BASE),
        "groq" => Some(GROQ_API_BASE),
        "glm" => Some(GLM_API_BASE),
        _ => None,
    }
}

pub struct OpenAICompatibleAdapter {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl OpenAICompatibleAdapter {
    pub fn new(api_key: &str, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_messages(request: &LLMRequest) -> Vec<ChatMessage<'_>> {
        let system = request
            .system_instruction
            .as_deref()
            .map(|content| ChatMessage { role: "system", content });

        system
            .into_iter()
            .chain(request.messages.iter().map(|m: &LLMMessage| ChatMessage {
                role: m.role.as_str(),
                content: m.content.as_str(),
            }))
            .collect()
    }
}

#[async_trait]
impl LLMAdapter for OpenAICompatibleAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let body = ChatRequest {
            model: &request.model,
            messages: Self::build_messages(request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Completion(format!("{} request failed: {}", request.provider, e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(AppError::Completion(format!(
                    "{} API error ({}): {} (code: {:?})",
                    request.provider, status, error_response.error.message, error_response.error.code
                )));
            }

            return Err(AppError::Completion(format!(
                "{} API error ({}): {}",
                request.provider, status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("Failed to decode {} response: {}", request.provider, e)))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Completion(format!("{} returned no choices", request.provider)))?;

        let usage = chat
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_urls() {
        assert_eq!(default_base_url("openai"), Some("https://api.openai.com/v1"));
        assert_eq!(default_base_url("glm"), Some("https://api.z.ai/api/paas/v4"));
        assert_eq!(default_base_url("anthropic"), None);
    }

    #[test]
    fn test_system_instruction_goes_first() {
        let request = LLMRequest {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            messages: vec![LLMMessage::user("Analyze this")],
            max_tokens: Some(100),
            temperature: Some(0.7),
            system_instruction: Some("You are an analyst".to_string()),
        };

        let messages = OpenAICompatibleAdapter::build_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "Analyze this");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let adapter = OpenAICompatibleAdapter::new("key", "http://localhost:8080/v1/");
        assert_eq!(adapter.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
