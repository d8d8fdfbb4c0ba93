//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Classifies upstream LLM failures so the advisor can log them meaningfully
//! before degrading to default advice.
//!
//! ## Error Categories
//!
//! - **RateLimit**: quota exhausted at the provider
//! - **Auth**: bad or missing API key
//! - **Network**: connectivity issues
//! - **Transient**: provider-side 5xx
//! - **ParseError**: response body could not be decoded
//!
//! ## Design Principles
//!
//! - Single unified error type (AgriError) for the entire application
//! - HTTP status mapping lives in the API layer, not here
//! - No panic/unwrap - all errors are recoverable

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for upstream completion failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited or quota exceeded
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Invalid request
    BadRequest,
    /// Response could not be decoded
    ParseError,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for log routing
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider failures onto an [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota")
            || lower.contains("resource_exhausted")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        if lower.contains("api key")
            || lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("permission denied")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timed out")
            || lower.contains("timeout")
            || lower.contains("unreachable")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("503") || lower.contains("502") || lower.contains("500") {
            return LlmError::with_provider(ErrorCategory::Transient, message, provider);
        }

        if lower.contains("parse") || lower.contains("decode") || lower.contains("json") {
            return LlmError::with_provider(ErrorCategory::ParseError, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 404 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            500..=599 => LlmError::with_provider(ErrorCategory::Transient, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }

    /// Classify a transport error from reqwest
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        if err.is_timeout() || err.is_connect() {
            return LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider);
        }
        if err.is_decode() {
            return LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider);
        }
        Self::classify(&err.to_string(), provider)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation failure, one entry per offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: {}", self.issues.join("; "))
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            issues: vec![message.into()],
        }
    }

    /// Collects issues and converts to an error only when at least one was recorded.
    pub fn from_issues(issues: Vec<String>) -> std::result::Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum AgriError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Upstream Errors
    // -------------------------------------------------------------------------
    /// Structured LLM error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Weather API error: {0}")]
    Weather(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Validation(ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<LlmError> for AgriError {
    fn from(err: LlmError) -> Self {
        AgriError::Llm(err)
    }
}

impl From<ValidationError> for AgriError {
    fn from(err: ValidationError) -> Self {
        AgriError::Validation(err)
    }
}

pub type Result<T> = std::result::Result<T, AgriError>;

impl AgriError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a validation error with a single message
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::single(message))
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| AgriError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| AgriError::Storage(format!("{}: {}", f().into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::Transient.to_string(), "TRANSIENT");
    }

    #[test]
    fn test_classify_quota() {
        let err = ErrorClassifier::classify("RESOURCE_EXHAUSTED: quota exceeded", "gemini");
        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert_eq!(err.provider.as_deref(), Some("gemini"));
    }

    #[test]
    fn test_classify_auth() {
        let err = ErrorClassifier::classify("API key not valid", "gemini");
        assert_eq!(err.category, ErrorCategory::Auth);
    }

    #[test]
    fn test_classify_network() {
        let err = ErrorClassifier::classify("Connection refused", "openai");
        assert_eq!(err.category, ErrorCategory::Network);
    }

    #[test]
    fn test_classify_unknown() {
        let err = ErrorClassifier::classify("Something weird happened", "test");
        assert_eq!(err.category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_classify_http_status() {
        assert_eq!(
            ErrorClassifier::classify_http_status(429, "slow down", "t").category,
            ErrorCategory::RateLimit
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(403, "denied", "t").category,
            ErrorCategory::Auth
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(503, "busy", "t").category,
            ErrorCategory::Transient
        );
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::Auth, "bad key", "gemini");
        assert_eq!(err.to_string(), "[gemini:AUTH] bad key");
        let bare = LlmError::new(ErrorCategory::Unknown, "oops");
        assert_eq!(bare.to_string(), "[UNKNOWN] oops");
    }

    #[test]
    fn test_validation_from_issues() {
        assert!(ValidationError::from_issues(vec![]).is_ok());
        let err = ValidationError::from_issues(vec!["a".into(), "b".into()]).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert_eq!(err.to_string(), "Validation failed: a; b");
    }

    #[test]
    fn test_with_context() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk gone"));
        let err = res.with_context("Failed to open").unwrap_err();
        assert!(matches!(err, AgriError::Storage(ref m) if m.starts_with("Failed to open")));
    }
}
