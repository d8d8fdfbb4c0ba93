//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/agriai/config.toml)
//! 3. Project config (./agriai.toml)
//! 4. Environment variables (AGRIAI_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigFormat, ConfigLoader, ENV_PREFIX};
pub use types::*;
