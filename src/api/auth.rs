//! Accounts and sessions.
//!
//! A request is authenticated by the `agriai_sid` cookie or an
//! `Authorization: Bearer` header carrying the same token.

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::AppState;
use super::error::{ApiError, ApiResult, OrInternal};
use crate::constants::session::{BCRYPT_COST, COOKIE_NAME};
use crate::storage::UserStore;
use crate::types::{AgriError, LoginRequest, ProfileUpdate, RegisterRequest, User};

const BAD_CREDENTIALS: &str = "Неверное имя пользователя или пароль";

/// The signed-in user, resolved from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// Session token from the cookie, else from a bearer header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        })
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let user_id = state
            .sessions
            .user_id(&token)
            .ok_or_else(ApiError::unauthorized)?;
        let user = UserStore::new(&state.db)
            .get(&user_id)
            .or_internal("Ошибка при получении данных пользователя")?
            .ok_or_else(ApiError::unauthorized)?;

        Ok(AuthUser { user, token })
    }
}

// =============================================================================
// Cookies
// =============================================================================

fn session_cookie(state: &AppState, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        COOKIE_NAME,
        token,
        state.sessions.ttl().as_secs()
    );
    if state.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn expired_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", COOKIE_NAME)
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    user: User,
    token: String,
}

fn signed_in(state: &AppState, status: StatusCode, user: User) -> Response {
    let token = state.sessions.create(&user.id);
    let cookie = session_cookie(state, &token);
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse { user, token }),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Response> {
    request.validate()?;

    let hash = bcrypt::hash(&request.password, BCRYPT_COST)
        .map_err(|e| AgriError::Storage(format!("Failed to hash password: {}", e)))
        .or_internal("Ошибка регистрации")?;

    let full_name = request
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let user = UserStore::new(&state.db)
        .create(&request.username, &hash, full_name)
        .or_internal("Ошибка регистрации")?;

    info!("Registered user {}", user.username);
    Ok(signed_in(&state, StatusCode::CREATED, user))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    request.validate()?;

    let Some((user, hash)) = UserStore::new(&state.db)
        .find_credentials(&request.username)
        .or_internal("Ошибка входа")?
    else {
        return Err(AgriError::Unauthorized(BAD_CREDENTIALS.to_string()).into());
    };

    let verified = bcrypt::verify(&request.password, &hash).unwrap_or_else(|e| {
        warn!("Stored password hash for {} is unreadable: {}", user.username, e);
        false
    });
    if !verified {
        return Err(AgriError::Unauthorized(BAD_CREDENTIALS.to_string()).into());
    }

    info!("User {} signed in", user.username);
    Ok(signed_in(&state, StatusCode::OK, user))
}

pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Response {
    state.sessions.revoke(&auth.token);
    (
        [(header::SET_COOKIE, expired_cookie())],
        Json(json!({ "message": "Успешный выход" })),
    )
        .into_response()
}

pub async fn me(auth: AuthUser) -> Json<serde_json::Value> {
    Json(json!({ "user": auth.user }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = UserStore::new(&state.db)
        .update_profile(&auth.user.id, &update)
        .or_internal("Ошибка при обновлении профиля")?
        .ok_or_else(|| ApiError::not_found("Пользователь не найден"))?;
    Ok(Json(json!({ "user": user })))
}
