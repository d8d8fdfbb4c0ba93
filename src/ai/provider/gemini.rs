//! Google Gemini Provider
//!
//! Calls `models/{model}:generateContent` on the Generative Language REST API.
//! The system prompt travels as `systemInstruction`; assistant turns use the
//! `model` role Gemini expects.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    CompletionRequest, ErrorClassifier, LlmProvider, LlmResponse, ResponseMetadata,
    ResponseTiming, TokenUsage,
};
use crate::config::LlmConfig;
use crate::types::{AgriError, ChatRole, Result};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const PROVIDER: &str = "gemini";

pub struct GeminiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AgriError::Config(
                    "Gemini API key not found. Set GEMINI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgriError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: request.system.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part { text: text.clone() }],
            }),
            contents: request
                .messages
                .iter()
                .map(|m| Content {
                    role: Some(
                        match m.role {
                            ChatRole::User => "user",
                            ChatRole::Assistant => "model",
                        }
                        .to_string(),
                    ),
                    parts: vec![Part {
                        text: m.text.clone(),
                    }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

/// Concatenated text of the first candidate; empty when the model returned none.
fn first_candidate_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        info!(
            "Completing with Gemini (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let body = self.build_request(request);
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        debug!("Sending request to Gemini API ({} chars)", request.char_len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Gemini API error ({}): {}", status, body),
                PROVIDER,
            )
            .into());
        }

        let response_body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let usage = response_body
            .usage_metadata
            .as_ref()
            .map(|u| TokenUsage::from_gemini(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        let text = first_candidate_text(response_body);

        debug!(
            "Received {} chars from Gemini in {}ms",
            text.chars().count(),
            elapsed.as_millis()
        );

        Ok(LlmResponse {
            text,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models/{}", self.api_base, self.model);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Gemini API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Gemini API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Gemini API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::Message;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(&LlmConfig {
            api_key: Some("gm-test".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_model() {
        let p = provider();
        assert_eq!(p.model(), "gemini-2.0-flash-exp");
        assert!(!format!("{:?}", p).contains("gm-test"));
    }

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest::conversation(
            "Вы агроном",
            vec![Message::user("Вопрос"), Message::assistant("Ответ")],
        );
        let body = serde_json::to_value(provider().build_request(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Вы агроном");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_prompt_without_system() {
        let body =
            serde_json::to_value(provider().build_request(&CompletionRequest::prompt("Анализ")))
                .unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_candidate_text_joined() {
        let raw = r#"{
            "candidates": [{"content": {"parts": [{"text": "Часть 1. "}, {"text": "Часть 2."}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_candidate_text(parsed), "Часть 1. Часть 2.");
    }

    #[test]
    fn test_blocked_response_is_empty_text() {
        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_candidate_text(parsed), "");

        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(first_candidate_text(parsed), "");
    }
}
