//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/agriai/config.toml)
//! 3. Project config (./agriai.toml)
//! 4. Environment variables (AGRIAI_* prefix, `__` separates sections)
//!
//! A `.env` file in the working directory is read into the process
//! environment before any of the above.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{AgriError, Result};

/// Environment prefix for overrides (`AGRIAI_SERVER__PORT=8080`)
pub const ENV_PREFIX: &str = "AGRIAI_";

/// Output format for `config show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
    Yaml,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// .env → defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from: {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("Ignoring unreadable .env: {}", e),
        }

        Self::load_from(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
            ENV_PREFIX,
        )
    }

    /// Resolve configuration from explicit locations.
    pub fn load_from(global: Option<&Path>, project: &Path, env_prefix: &str) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // AGRIAI_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed(env_prefix).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| AgriError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| AgriError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/agriai/)
    pub fn global_dir() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("agriai"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("agriai.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(format: ConfigFormat) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render(&config, format)?);
        Ok(())
    }

    /// Serialize a configuration; secrets are never included.
    pub fn render(config: &Config, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| AgriError::Config(e.to_string()))
            }
            ConfigFormat::Yaml => {
                serde_yaml::to_string(config).map_err(|e| AgriError::Config(e.to_string()))
            }
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a starter config file, globally or in the working directory.
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let path = if global {
            let dir = Self::global_dir().ok_or_else(|| {
                AgriError::Config("Cannot determine global config directory".to_string())
            })?;
            fs::create_dir_all(&dir)?;
            dir.join("config.toml")
        } else {
            Self::project_config_path()
        };

        Self::write_default(&path, force)?;
        Ok(path)
    }

    fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(());
        }
        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default config content (TOML)
    fn default_config() -> String {
        r#"# AgriAI Configuration
# Project settings in ./agriai.toml override ~/.config/agriai/config.toml.
# Any key can be overridden from the environment, e.g. AGRIAI_SERVER__PORT=8080.

version = "1.0"

[server]
host = "0.0.0.0"
port = 5000
cors_origins = []

[database]
path = "agriai.db"

# API key: GEMINI_API_KEY / OPENAI_API_KEY or llm.api_key
[llm]
provider = "gemini"
timeout_secs = 120
temperature = 0.7
max_tokens = 2048

# API key: OPENWEATHER_API_KEY or weather.api_key
[weather]
api_base = "https://api.openweathermap.org/data/2.5"
timeout_secs = 15

# "json" or "text"
[advisor]
feeding_plan_format = "json"
fertilizer_format = "json"
chat_history_limit = 50

[auth]
session_ttl_hours = 168
cookie_secure = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseFormat;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_from(
            None,
            &temp_dir.path().join("agriai.toml"),
            "AGRIAI_TEST_NONE_",
        )
        .unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("agriai.toml");
        fs::write(&global, "[server]\nport = 7000\n[llm]\nprovider = \"openai\"\n").unwrap();
        fs::write(&project, "[server]\nport = 8080\n").unwrap();

        let config = ConfigLoader::load_from(Some(&global), &project, "AGRIAI_TEST_NONE_").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: prefix is unique to this test
        unsafe {
            std::env::set_var("AGRIAI_TEST_ENV_ADVISOR__FEEDING_PLAN_FORMAT", "text");
        }
        let config = ConfigLoader::load_from(
            None,
            &temp_dir.path().join("agriai.toml"),
            "AGRIAI_TEST_ENV_",
        )
        .unwrap();
        unsafe {
            std::env::remove_var("AGRIAI_TEST_ENV_ADVISOR__FEEDING_PLAN_FORMAT");
        }
        assert_eq!(config.advisor.feeding_plan_format, ResponseFormat::Text);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[llm]\ntemperature = 9.0\n").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(AgriError::Config(_))
        ));
    }

    #[test]
    fn test_default_template_parses() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agriai.toml");
        ConfigLoader::write_default(&path, false).unwrap();
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.auth.session_ttl_hours, 168);
        assert_eq!(config.advisor.chat_history_limit, 50);
    }

    #[test]
    fn test_write_default_respects_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agriai.toml");
        fs::write(&path, "# mine\n").unwrap();
        ConfigLoader::write_default(&path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");
        ConfigLoader::write_default(&path, true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[server]"));
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let json = ConfigLoader::render(&config, ConfigFormat::Json).unwrap();
        assert!(json.contains("\"provider\": \"gemini\""));
        let yaml = ConfigLoader::render(&config, ConfigFormat::Yaml).unwrap();
        assert!(yaml.contains("provider: gemini"));
        let toml_text = ConfigLoader::render(&config, ConfigFormat::Toml).unwrap();
        assert!(toml_text.contains("[server]"));
    }
}
