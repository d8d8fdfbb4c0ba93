//! OpenWeather Client
//!
//! Current conditions for a coordinate pair from the `/weather` endpoint,
//! in metric units with Russian descriptions.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::WeatherConfig;
use crate::types::{AgriError, Result, round_to};

const UNKNOWN_LOCATION: &str = "Неизвестная локация";

/// Current weather as served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: i64,
    pub pressure: i64,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    pub location: String,
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReadings,
    wind: Wind,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: i64,
    pressure: i64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
    icon: String,
}

impl From<CurrentWeather> for WeatherData {
    fn from(raw: CurrentWeather) -> Self {
        let condition = raw.weather.into_iter().next();
        Self {
            temperature: raw.main.temp.round() as i64,
            feels_like: raw.main.feels_like.round() as i64,
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            wind_speed: round_to(raw.wind.speed, 1),
            description: condition
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            icon: condition.map(|c| c.icon).unwrap_or_default(),
            location: raw
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

pub struct WeatherClient {
    api_key: Option<SecretString>,
    api_base: String,
    client: reqwest::Client,
}

pub type SharedWeather = Arc<WeatherClient>;

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl WeatherClient {
    /// A missing key is not an error here; lookups fail until one is set.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENWEATHER_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgriError::Weather(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherData> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AgriError::Config("OPENWEATHER_API_KEY не настроен".to_string()))?;

        debug!("Fetching weather for ({}, {})", latitude, longitude);

        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let response = self
            .client
            .get(format!("{}/weather", self.api_base))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key.expose_secret()),
                ("units", "metric"),
                ("lang", "ru"),
            ])
            .send()
            .await
            .map_err(|e| lookup_failed(&e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(lookup_failed(&format!(
                "OpenWeather API вернул ошибку: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )));
        }

        let raw: CurrentWeather = response
            .json()
            .await
            .map_err(|e| lookup_failed(&e.to_string()))?;

        Ok(raw.into())
    }
}

fn lookup_failed(reason: &str) -> AgriError {
    error!("Weather lookup failed: {}", reason);
    AgriError::Weather(format!("Не удалось получить данные о погоде: {}", reason))
}
