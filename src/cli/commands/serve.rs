//! Serve Command
//!
//! Load configuration, open the database and run the HTTP API until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::advisor::Advisor;
use crate::ai::create_provider;
use crate::api::{self, AppState};
use crate::config::{Config, ConfigLoader};
use crate::storage::Database;
use crate::types::Result;
use crate::weather::WeatherClient;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub provider: Option<String>,
}

impl ServeOptions {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = self.database {
            config.database.path = path;
        }
        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
    }
}

pub async fn run(options: ServeOptions) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    options.apply(&mut config);
    config.validate()?;

    let db = Database::open(&config.database.path)?;
    db.initialize()?;

    let provider = create_provider(&config.llm)?;
    info!(
        "Using LLM provider {} (model: {})",
        provider.name(),
        provider.model()
    );
    let advisor = Arc::new(Advisor::from_config(provider, &config));

    let weather = WeatherClient::new(&config.weather)?;
    if !weather.is_configured() {
        warn!("OPENWEATHER_API_KEY is not set; weather requests will fail");
    }

    let state = AppState::new(Arc::new(db), advisor, Arc::new(weather), &config.auth);
    api::spawn_session_sweeper(state.sessions.clone(), SESSION_SWEEP_INTERVAL);
    let app = api::router(state, &config.server.cors_origins);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("AgriAI listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_override_config() {
        let mut config = Config::default();
        ServeOptions {
            port: Some(8081),
            provider: Some("fake".into()),
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.provider, "fake");
        assert_eq!(config.database.path, PathBuf::from("agriai.db"));
    }
}
