//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait: one text completion per call, no retries,
//! no streaming. The request carries an optional system instruction and an
//! ordered conversation; single-prompt calls are a one-message conversation.
//!
//! ## Providers
//!
//! - `gemini`: Google Generative Language REST API (default)
//! - `openai`: OpenAI-compatible Chat Completions
//! - `fake`: deterministic canned responses for offline runs and tests

mod fake;
mod gemini;
mod openai;

pub use fake::FakeProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{AgriError, ChatRole, Result};

// =============================================================================
// Completion Request
// =============================================================================

/// One turn of a conversation sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: ChatRole,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// Provider-neutral completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    /// Single user prompt, no system instruction.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            system: None,
            messages: vec![Message::user(text)],
        }
    }

    /// Conversation with a system instruction.
    pub fn conversation(system: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system: Some(system.into()),
            messages,
        }
    }

    /// Total characters sent, for logging.
    pub fn char_len(&self) -> usize {
        self.system.as_ref().map_or(0, |s| s.chars().count())
            + self
                .messages
                .iter()
                .map(|m| m.text.chars().count())
                .sum::<usize>()
    }
}

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Completion text plus usage metrics.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text; may be empty
    pub text: String,
    pub usage: TokenUsage,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with text only (usage unknown)
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Create from OpenAI-style usage response
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }

    /// Create from Gemini `usageMetadata`
    pub fn from_gemini(prompt_token_count: u32, candidates_token_count: u32) -> Self {
        Self {
            input_tokens: prompt_token_count,
            output_tokens: candidates_token_count,
        }
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

/// Shared LLM provider type for concurrent access across request handlers.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion. Upstream failures are returned as errors; the
    /// caller decides whether to degrade to default content.
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable with the configured credentials
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &LlmConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config)?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        "fake" => Ok(Arc::new(FakeProvider::new())),
        _ => Err(AgriError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai, fake",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_unknown_provider() {
        let config = LlmConfig {
            provider: "claude".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_provider(&config),
            Err(AgriError::Config(_))
        ));
    }

    #[test]
    fn test_create_fake_provider() {
        let config = LlmConfig {
            provider: "fake".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "fake");
    }

    #[test]
    fn test_request_char_len() {
        let request = CompletionRequest::conversation(
            "система",
            vec![Message::user("привет"), Message::assistant("да")],
        );
        assert_eq!(request.char_len(), 7 + 6 + 2);
        assert_eq!(CompletionRequest::prompt("abc").char_len(), 3);
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage::from_gemini(120, 80);
        assert_eq!(usage.total(), 200);
        assert_eq!(TokenUsage::from_openai(100, 50).total(), 150);
    }
}
