//! Router harness for handler tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use super::{AppState, SessionStore, router};
use crate::advisor::Advisor;
use crate::ai::FakeProvider;
use crate::config::{AdvisorConfig, WeatherConfig};
use crate::storage::Database;
use crate::weather::WeatherClient;

pub struct TestApp {
    pub router: Router,
    pub fake: Arc<FakeProvider>,
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_fake(FakeProvider::new())
    }

    pub fn with_fake(fake: FakeProvider) -> Self {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let fake = Arc::new(fake);
        let advisor = Advisor::new(fake.clone(), AdvisorConfig::default(), Duration::from_secs(5));
        let weather = WeatherClient::new(&WeatherConfig {
            api_key: Some(String::new()),
            ..WeatherConfig::default()
        })
        .unwrap();

        let state = AppState {
            db: Arc::new(db),
            advisor: Arc::new(advisor),
            weather: Arc::new(weather),
            sessions: Arc::new(SessionStore::new(Duration::from_secs(3600))),
            cookie_secure: false,
        };

        Self {
            router: router(state, &[]),
            fake,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn builder(method: &str, path: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match token {
            Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {}", t)),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response<Body> {
        self.send(Self::builder("GET", path, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Response<Body> {
        self.send(Self::builder("DELETE", path, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn send_json(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> Response<Body> {
        self.send(
            Self::builder(method, path, token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> Response<Body> {
        self.send_json("POST", path, token, body).await
    }

    pub async fn request_with_cookie(&self, method: &str, path: &str, cookie: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(path)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Register `username` with password `secret1` and return the token.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post_json(
                "/api/auth/register",
                None,
                json!({"username": username, "password": "secret1"}),
            )
            .await;
        read_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn create_field(&self, token: &str) -> String {
        let response = self
            .post_json(
                "/api/fields",
                Some(token),
                json!({
                    "name": "Северное",
                    "latitude": 51.18,
                    "longitude": 71.45,
                    "area": 25.0,
                    "cropType": "Пшеница"
                }),
            )
            .await;
        read_json(response).await["field"]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn create_livestock(&self, token: &str, count: i64) -> String {
        let response = self
            .post_json(
                "/api/livestock",
                Some(token),
                json!({"type": "Коровы", "count": count}),
            )
            .await;
        read_json(response).await["livestock"]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn create_feed(&self, token: &str, livestock_id: &str, quantity: &str) -> String {
        let response = self
            .post_json(
                &format!("/api/livestock/{}/feeds", livestock_id),
                Some(token),
                json!({"name": "Сено", "quantity": quantity}),
            )
            .await;
        read_json(response).await["id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}
