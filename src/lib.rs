//! AgriAI - Farm Management Backend with AI Advice
//!
//! Farmers record fields, livestock groups and their feed and fertilizer
//! stock; an LLM turns that data into agronomy and feeding advice.
//!
//! ## Core Features
//!
//! - **Advisor**: prompt building and tolerant parsing of completion text into
//!   structured results, falling back to defaults instead of failing
//! - **Inventory rebalancing**: feed stock follows head-count reductions, with
//!   compensating writes when a step fails
//! - **HTTP API**: session-authenticated JSON routes over SQLite
//!
//! ## Quick Start
//!
//! ```ignore
//! use agriai::{Advisor, ConfigLoader, create_provider};
//!
//! let config = ConfigLoader::load()?;
//! let provider = create_provider(&config.llm)?;
//! let advisor = Advisor::from_config(provider, &config);
//! let plan = advisor.feeding_plan(&herd).await;
//! ```
//!
//! ## Modules
//!
//! - [`advisor`]: completion calls with per-operation fallbacks
//! - [`ai`]: providers, prompts, response parsing
//! - [`inventory`]: head-count driven feed rebalancing
//! - [`storage`]: SQLite persistence with connection pooling
//! - [`api`]: axum router and handlers

pub mod advisor;
pub mod ai;
pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod inventory;
pub mod storage;
pub mod types;
pub mod weather;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, ResponseFormat};

// Error Types
pub use types::error::{AgriError, ErrorCategory, Result, ResultExt};

// Storage
pub use storage::database::PoolConfig;
pub use storage::{Database, SharedDatabase};

// =============================================================================
// Service Re-exports
// =============================================================================

pub use advisor::{Advisor, SharedAdvisor};
pub use ai::{
    CompletionRequest, FakeProvider, LlmProvider, LlmResponse, SharedProvider, create_provider,
};
pub use api::{AppState, router};
pub use inventory::{InventoryRebalancer, RebalanceFailure, RebalanceOutcome};
pub use weather::{WeatherClient, WeatherData};
