//! AI Integration Layer
//!
//! Completion providers, prompt rendering, JSON recovery and the response
//! parsers that turn completion text into advisor results.

pub mod defaults;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use parser::{
    AnalysisStrategy, FeedingPlanStrategy, parse_category, parse_feed_analysis,
    parse_feeding_plan, parse_fertilizer_analysis, parse_field_analysis,
};
pub use prompt::{AdvisorPrompts, PromptBuilder, PromptSection};
pub use provider::{
    CompletionRequest, ErrorCategory, ErrorClassifier, FakeProvider, LlmError, LlmProvider,
    LlmResponse, Message, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use timeout::with_timeout;
pub use validation::{JsonRepairer, extract_json_object};
