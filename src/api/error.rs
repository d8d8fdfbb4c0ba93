//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": ...}`; validation failures carry
//! the list of issues instead of a single message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::inventory::RebalanceFailure;
use crate::types::{AgriError, ValidationError};

const INTERNAL: &str = "Внутренняя ошибка сервера";

#[derive(Debug)]
pub enum ApiError {
    Agri(AgriError),
    Rebalance(RebalanceFailure),
    /// Failure whose cause stays in the log; clients see only `message`.
    Internal {
        message: &'static str,
        cause: AgriError,
    },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Agri(AgriError::NotFound(message.into()))
    }

    pub fn forbidden() -> Self {
        Self::Agri(AgriError::Forbidden("Доступ запрещен".to_string()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Agri(AgriError::Conflict(message.into()))
    }

    pub fn unauthorized() -> Self {
        Self::Agri(AgriError::Unauthorized(
            "Необходима авторизация".to_string(),
        ))
    }
}

/// Attach a client-facing message to a storage or upstream failure.
pub trait OrInternal<T> {
    fn or_internal(self, message: &'static str) -> ApiResult<T>;
}

impl<T> OrInternal<T> for crate::types::Result<T> {
    fn or_internal(self, message: &'static str) -> ApiResult<T> {
        self.map_err(|cause| match cause {
            AgriError::Validation(_)
            | AgriError::NotFound(_)
            | AgriError::Forbidden(_)
            | AgriError::Unauthorized(_)
            | AgriError::Conflict(_) => ApiError::Agri(cause),
            cause => ApiError::Internal { message, cause },
        })
    }
}

impl From<AgriError> for ApiError {
    fn from(err: AgriError) -> Self {
        Self::Agri(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Agri(AgriError::Validation(err))
    }
}

impl From<RebalanceFailure> for ApiError {
    fn from(err: RebalanceFailure) -> Self {
        Self::Rebalance(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Rebalance(failure) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": failure.message, "details": failure.details }),
            ),
            ApiError::Internal { message, cause } => {
                error!("{}: {}", message, cause);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
            ApiError::Agri(err) => match err {
                AgriError::Validation(v) => (StatusCode::BAD_REQUEST, json!({ "error": v.issues })),
                AgriError::Conflict(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
                AgriError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
                AgriError::Forbidden(m) => (StatusCode::FORBIDDEN, json!({ "error": m })),
                AgriError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, json!({ "error": m })),
                AgriError::Config(m) | AgriError::Weather(m) => {
                    error!("{}", m);
                    (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": m }))
                }
                other => {
                    error!("Unhandled error: {}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": INTERNAL }))
                }
            },
        };

        (status, Json(body)).into_response()
    }
}
