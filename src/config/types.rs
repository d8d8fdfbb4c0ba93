//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/agriai/) and project (./agriai.toml) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{chat, network, session};
use crate::types::{AgriError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// SQLite settings
    pub database: DatabaseConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// OpenWeather settings
    pub weather: WeatherConfig,

    /// Prompt/parse behavior
    pub advisor: AdvisorConfig,

    /// Session settings
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            llm: LlmConfig::default(),
            weather: WeatherConfig::default(),
            advisor: AdvisorConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `AgriError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AgriError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(AgriError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.weather.timeout_secs == 0 {
            return Err(AgriError::Config(
                "Weather timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.advisor.chat_history_limit == 0 {
            return Err(AgriError::Config(
                "Advisor chat_history_limit must be greater than 0".to_string(),
            ));
        }

        if self.auth.session_ttl_hours == 0 {
            return Err(AgriError::Config(
                "Auth session_ttl_hours must be greater than 0".to_string(),
            ));
        }

        validate_endpoint("weather.api_base", &self.weather.api_base)?;
        if let Some(api_base) = &self.llm.api_base {
            validate_endpoint("llm.api_base", api_base)?;
        }

        Ok(())
    }
}

/// Endpoints must be absolute http(s) URLs.
fn validate_endpoint(name: &str, endpoint: &str) -> Result<()> {
    let url = url::Url::parse(endpoint)
        .map_err(|e| AgriError::Config(format!("Invalid {} URL '{}': {}", name, endpoint, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AgriError::Config(format!(
            "{} must use http or https scheme, got: {}",
            name,
            url.scheme()
        )));
    }
    Ok(())
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means same-origin only
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: network::DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Database Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("agriai.db"),
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// LLM provider settings.
///
/// The API key is never serialized and is redacted in debug output; providers
/// also fall back to `GEMINI_API_KEY` / `OPENAI_API_KEY`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider: "gemini", "openai", "fake"
    pub provider: String,

    /// Model name (provider default when unset)
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    pub max_tokens: usize,

    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Custom endpoint base URL
    pub api_base: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            timeout_secs: network::DEFAULT_LLM_TIMEOUT_SECS,
            temperature: 0.7,
            max_tokens: 2048,
            api_key: None,
            api_base: None,
        }
    }
}

// =============================================================================
// Weather Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_base: String,

    pub timeout_secs: u64,

    /// Falls back to `OPENWEATHER_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openweathermap.org/data/2.5".to_string(),
            timeout_secs: network::DEFAULT_WEATHER_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

// =============================================================================
// Advisor Configuration
// =============================================================================

/// Which response convention a prompt asks the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Strict JSON object
    #[default]
    Json,
    /// Labeled free text parsed by line heuristics
    Text,
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseFormat::Json => write!(f, "json"),
            ResponseFormat::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub feeding_plan_format: ResponseFormat,
    pub fertilizer_format: ResponseFormat,
    /// Messages of history sent with each chat turn
    pub chat_history_limit: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            feeding_plan_format: ResponseFormat::Json,
            fertilizer_format: ResponseFormat::Json,
            chat_history_limit: chat::DEFAULT_HISTORY_LIMIT,
        }
    }
}

// =============================================================================
// Auth Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_hours: u64,
    /// Mark the session cookie `Secure` (enable behind HTTPS)
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: session::DEFAULT_TTL_HOURS,
            cookie_secure: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.advisor.chat_history_limit, 50);
    }

    #[test]
    fn test_invalid_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(matches!(config.validate(), Err(AgriError::Config(_))));
    }

    #[test]
    fn test_endpoint_validation() {
        let mut config = Config::default();
        config.weather.api_base = "ftp://weather.example".to_string();
        assert!(matches!(config.validate(), Err(AgriError::Config(_))));

        let mut config = Config::default();
        config.llm.api_base = Some("not a url".to_string());
        assert!(config.validate().is_err());

        config.llm.api_base = Some("http://localhost:8080/v1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_redacted() {
        let llm = LlmConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", llm);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = Config {
            llm: LlmConfig {
                api_key: Some("super-secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("super-secret"));
    }

    #[test]
    fn test_response_format_parse() {
        let config: AdvisorConfig =
            toml::from_str("feeding_plan_format = \"text\"").unwrap();
        assert_eq!(config.feeding_plan_format, ResponseFormat::Text);
        assert_eq!(config.fertilizer_format, ResponseFormat::Json);
    }
}
