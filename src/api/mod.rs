//! HTTP API
//!
//! JSON routes under `/api`. Everything except registration, login and the
//! health probe requires a session.
//!
//! Handlers call the synchronous storage layer directly; each query is a
//! short pooled SQLite call.

pub mod auth;
pub mod chat;
pub mod error;
pub mod fields;
pub mod livestock;
pub mod session;

#[cfg(test)]
mod test_support;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::advisor::SharedAdvisor;
use crate::config::AuthConfig;
use crate::storage::SharedDatabase;
use crate::weather::{SharedWeather, WeatherData};

pub use auth::AuthUser;
pub use error::{ApiError, ApiResult};
pub use session::SessionStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDatabase,
    pub advisor: SharedAdvisor,
    pub weather: SharedWeather,
    pub sessions: Arc<SessionStore>,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        db: SharedDatabase,
        advisor: SharedAdvisor,
        weather: SharedWeather,
        auth: &AuthConfig,
    ) -> Self {
        Self {
            db,
            advisor,
            weather,
            sessions: Arc::new(SessionStore::new(Duration::from_secs(
                auth.session_ttl_hours * 3600,
            ))),
            cookie_secure: auth.cookie_secure,
        }
    }
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/profile", patch(auth::update_profile))
        // Fields
        .route("/fields", get(fields::list).post(fields::create))
        .route("/fields/{id}", patch(fields::update).delete(fields::delete))
        .route("/fields/{id}/analyze", post(fields::analyze))
        .route(
            "/fields/{id}/recommendations/{category}",
            get(fields::recommendations),
        )
        .route("/fields/{id}/summary", get(fields::summary))
        .route(
            "/fields/{id}/fertilizers",
            get(fields::list_fertilizers).post(fields::create_fertilizer),
        )
        .route(
            "/fertilizers/{id}",
            put(fields::update_fertilizer).delete(fields::delete_fertilizer),
        )
        .route(
            "/fields/{id}/analyze-fertilizers",
            post(fields::analyze_fertilizers),
        )
        // Livestock
        .route("/livestock", get(livestock::list).post(livestock::create))
        .route(
            "/livestock/{id}",
            patch(livestock::update).delete(livestock::delete),
        )
        .route("/livestock/{id}/feeding-plan", post(livestock::feeding_plan))
        .route(
            "/livestock/{id}/feeds",
            get(livestock::list_feeds).post(livestock::create_feed),
        )
        .route(
            "/feeds/{id}",
            put(livestock::update_feed).delete(livestock::delete_feed),
        )
        .route("/livestock/{id}/analyze-feeds", post(livestock::analyze_feeds))
        // Chat
        .route("/chat/history", get(chat::history).delete(chat::clear))
        .route("/chat/message", post(chat::send))
        .route("/weather", get(weather));

    let mut app = Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(cors_origins) {
        app = app.layer(cors);
    }
    app
}

/// CORS for the configured origins; `None` keeps the API same-origin.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", o, e);
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        return None;
    }

    debug!("CORS enabled for {} origins", allowed.len());
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
    )
}

/// Drop expired sessions every `interval`.
pub fn spawn_session_sweeper(sessions: Arc<SessionStore>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired sessions", purged);
            }
        }
    });
}

// =============================================================================
// Small Handlers
// =============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    latitude: Option<String>,
    longitude: Option<String>,
}

fn coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

async fn weather(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Json<WeatherData>> {
    let (Some(latitude), Some(longitude)) = (
        coordinate(query.latitude.as_deref()),
        coordinate(query.longitude.as_deref()),
    ) else {
        return Err(ApiError::bad_request("Необходимо указать координаты"));
    };

    Ok(Json(state.weather.current(latitude, longitude).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use super::test_support::{TestApp, read_json};

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new();
        let response = app.get("/api/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_routes_require_session() {
        let app = TestApp::new();
        for path in ["/api/fields", "/api/livestock", "/api/chat/history", "/api/auth/me"] {
            let response = app.get(path, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
        }
        let forged = app.get("/api/fields", Some("not-a-session")).await;
        assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_weather_requires_coordinates() {
        let app = TestApp::new();
        let token = app.register("farmer").await;

        let response = app.get("/api/weather?latitude=51.1", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            read_json(response).await["error"],
            "Необходимо указать координаты"
        );

        let response = app
            .get("/api/weather?latitude=abc&longitude=71.4", Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_weather_without_key_is_500() {
        let app = TestApp::new();
        let token = app.register("farmer").await;

        let response = app
            .get("/api/weather?latitude=51.1&longitude=71.4", Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            read_json(response).await["error"],
            "OPENWEATHER_API_KEY не настроен"
        );
    }

    #[test]
    fn test_cors_layer_only_for_valid_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_some());
    }
}
