//! Advisor Service
//!
//! Orchestrates prompt → completion → parse for every analysis kind.
//! Analysis calls never fail: upstream errors and timeouts are logged at warn
//! and replaced by the kind's fallback payload. Chat is the exception and
//! propagates errors to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::ai::defaults;
use crate::ai::parser::{
    parse_category, parse_feed_analysis, parse_feeding_plan, parse_fertilizer_analysis,
    parse_field_analysis,
};
use crate::ai::prompt::AdvisorPrompts;
use crate::ai::provider::{CompletionRequest, Message, SharedProvider};
use crate::ai::timeout::with_timeout;
use crate::config::{AdvisorConfig, Config};
use crate::constants::chat as chat_constants;
use crate::types::{
    CategoryRecommendation, ChatMessage, ChatRole, FeedAnalysis, FertilizerAnalysis,
    FieldAnalysis, FieldProfile, FieldSummary, HerdProfile, InventoryLine, LivestockFeedingPlan,
    RecommendationCategory, Result,
};

pub type SharedAdvisor = Arc<Advisor>;

pub struct Advisor {
    provider: SharedProvider,
    config: AdvisorConfig,
    timeout: Duration,
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Advisor {
    pub fn new(provider: SharedProvider, config: AdvisorConfig, timeout: Duration) -> Self {
        Self {
            provider,
            config,
            timeout,
        }
    }

    pub fn from_config(provider: SharedProvider, config: &Config) -> Self {
        Self::new(
            provider,
            config.advisor.clone(),
            Duration::from_secs(config.llm.timeout_secs),
        )
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    /// Messages of history sent with each chat turn.
    pub fn chat_history_limit(&self) -> usize {
        self.config.chat_history_limit
    }

    async fn complete(&self, request: CompletionRequest, operation: &str) -> Result<String> {
        debug!("{}: sending {} chars", operation, request.char_len());
        let start = Instant::now();

        let response = with_timeout(
            self.timeout,
            self.provider.complete(&request),
            operation,
        )
        .await?;

        info!(
            "{} completed by {} in {}ms ({} tokens)",
            operation,
            response.metadata.provider,
            start.elapsed().as_millis(),
            response.usage.total()
        );
        Ok(response.text)
    }

    async fn complete_prompt(&self, prompt: String, operation: &str) -> Result<String> {
        self.complete(CompletionRequest::prompt(prompt), operation)
            .await
    }

    pub async fn analyze_field(&self, field: &FieldProfile) -> FieldAnalysis {
        let prompt = AdvisorPrompts::field_analysis(field);
        match self.complete_prompt(prompt, "field analysis").await {
            Ok(text) => parse_field_analysis(&text),
            Err(e) => {
                warn!("Field analysis for '{}' failed, using defaults: {}", field.name, e);
                defaults::field_analysis_fallback()
            }
        }
    }

    pub async fn feeding_plan(&self, herd: &HerdProfile) -> LivestockFeedingPlan {
        let prompt = AdvisorPrompts::feeding_plan(herd, self.config.feeding_plan_format);
        match self.complete_prompt(prompt, "feeding plan").await {
            Ok(text) => parse_feeding_plan(&text, herd),
            Err(e) => {
                warn!("Feeding plan for {} {} failed, using defaults: {}", herd.count, herd.kind, e);
                defaults::feeding_plan_fallback(herd)
            }
        }
    }

    pub async fn category_recommendation(
        &self,
        field: &FieldProfile,
        category: RecommendationCategory,
    ) -> CategoryRecommendation {
        let prompt = AdvisorPrompts::category(field, category);
        match self.complete_prompt(prompt, "category recommendation").await {
            Ok(text) => parse_category(&text, category),
            Err(e) => {
                warn!(
                    "{} recommendations for '{}' failed, using defaults: {}",
                    category.title(),
                    field.name,
                    e
                );
                defaults::category_fallback(category)
            }
        }
    }

    /// All three categories, requested concurrently.
    pub async fn field_summary(&self, field: &FieldProfile) -> FieldSummary {
        let (fertilizer, soil, pesticides) = futures::join!(
            self.category_recommendation(field, RecommendationCategory::Fertilizer),
            self.category_recommendation(field, RecommendationCategory::Soil),
            self.category_recommendation(field, RecommendationCategory::Pesticides),
        );
        FieldSummary {
            fertilizer,
            soil,
            pesticides,
        }
    }

    /// An empty inventory short-circuits without a completion.
    pub async fn analyze_feeds(&self, herd: &HerdProfile, feeds: &[InventoryLine]) -> FeedAnalysis {
        if feeds.is_empty() {
            return defaults::feed_analysis_empty();
        }
        let prompt = AdvisorPrompts::feed_analysis(herd, feeds);
        match self.complete_prompt(prompt, "feed analysis").await {
            Ok(text) => parse_feed_analysis(&text, herd),
            Err(e) => {
                warn!("Feed analysis failed, using defaults: {}", e);
                defaults::feed_analysis_fallback(herd)
            }
        }
    }

    /// An empty inventory short-circuits without a completion.
    pub async fn analyze_fertilizers(
        &self,
        field: &FieldProfile,
        fertilizers: &[InventoryLine],
    ) -> FertilizerAnalysis {
        if fertilizers.is_empty() {
            return defaults::fertilizer_analysis_empty();
        }
        let prompt =
            AdvisorPrompts::fertilizer_analysis(field, fertilizers, self.config.fertilizer_format);
        match self.complete_prompt(prompt, "fertilizer analysis").await {
            Ok(text) => parse_fertilizer_analysis(&text, field),
            Err(e) => {
                warn!("Fertilizer analysis for '{}' failed, using defaults: {}", field.name, e);
                defaults::fertilizer_analysis_fallback(&field.name)
            }
        }
    }

    /// Reply to the latest turn of `history`. Errors propagate.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        fields: &[FieldProfile],
        herds: &[HerdProfile],
    ) -> Result<String> {
        let messages = history
            .iter()
            .map(|m| match m.role {
                ChatRole::User => Message::user(&m.content),
                ChatRole::Assistant => Message::assistant(&m.content),
            })
            .collect();
        let request =
            CompletionRequest::conversation(AdvisorPrompts::chat_system(fields, herds), messages);

        let text = self.complete(request, "chat").await?;
        if text.trim().is_empty() {
            return Ok(chat_constants::EMPTY_REPLY.to_string());
        }
        Ok(text)
    }
}
