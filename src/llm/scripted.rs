//! In-process completion adapter.
//!
//! Answers each request with the output of a closure and records every
//! request it receives, so callers can assert on prompts and temperatures.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::llm::provider::LLMAdapter;
use crate::types::{AppResult, LLMRequest, LLMResponse, TokenUsage};

type Responder = Box<dyn Fn(&LLMRequest) -> AppResult<String> + Send + Sync>;

pub struct ScriptedAdapter {
    responder: Responder,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedAdapter {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&LLMRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Adapter that answers every request with the same text
    pub fn constant(content: impl Into<String>) -> Self {
        let content = content.into();
        Self::new(move |_| Ok(content.clone()))
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl LLMAdapter for ScriptedAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let content = (self.responder)(request)?;
        Ok(LLMResponse {
            content,
            finish_reason: "stop".to_string(),
            usage: TokenUsage::default(),
        })
    }
}
