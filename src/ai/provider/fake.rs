//! Fake Provider
//!
//! Deterministic, network-free provider. Responses are scripted by substring:
//! the first rule whose needle occurs in the request's system prompt or any
//! message wins, otherwise the default response is returned.
//!
//! Every request is recorded so callers can assert how many completions ran.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    CompletionRequest, ErrorCategory, LlmError, LlmProvider, LlmResponse, ResponseMetadata,
    TokenUsage,
};
use crate::types::Result;

const PROVIDER: &str = "fake";

const DEFAULT_RESPONSE: &str = "1. Проведите анализ почвы перед посевом\n\
2. Соблюдайте рекомендованные нормы внесения\n\
3. Контролируйте влажность и состояние посевов";

#[derive(Debug)]
pub struct FakeProvider {
    rules: Vec<(String, String)>,
    default_response: String,
    failing: AtomicBool,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_response: DEFAULT_RESPONSE.to_string(),
            failing: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Respond with `response` when `needle` occurs anywhere in the request.
    pub fn with_response(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((needle.into(), response.into()));
        self
    }

    /// Response used when no rule matches.
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Every call fails with a transient upstream error.
    pub fn failing() -> Self {
        let provider = Self::new();
        provider.set_failing(true);
        provider
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    /// Copies of every request received, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.lock_requests().clone()
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<CompletionRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn respond(&self, request: &CompletionRequest) -> String {
        let haystacks: Vec<&str> = request
            .system
            .iter()
            .map(String::as_str)
            .chain(request.messages.iter().map(|m| m.text.as_str()))
            .collect();

        self.rules
            .iter()
            .find(|(needle, _)| haystacks.iter().any(|h| h.contains(needle.as_str())))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone())
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        self.lock_requests().push(request.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(LlmError::with_provider(
                ErrorCategory::Transient,
                "scripted failure",
                PROVIDER,
            )
            .into());
        }

        let text = self.respond(request);
        Ok(LlmResponse {
            usage: TokenUsage {
                input_tokens: request.char_len() as u32,
                output_tokens: text.chars().count() as u32,
            },
            text,
            timing: Default::default(),
            metadata: ResponseMetadata {
                model: PROVIDER.to_string(),
                provider: PROVIDER.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        PROVIDER
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }
}
