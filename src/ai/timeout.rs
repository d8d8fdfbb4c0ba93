//! Operation Timeouts
//!
//! Outbound calls are bounded twice: by the HTTP client timeout inside each
//! client, and by `with_timeout` around the whole operation so that slow
//! body reads and non-HTTP providers are covered too.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let result = with_timeout(
//!     Duration::from_secs(config.llm.timeout_secs),
//!     async { /* completion */ },
//!     "field analysis completion"
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{AgriError, Result};

/// Execute an async operation with a timeout
///
/// Returns `AgriError::Timeout` if the operation doesn't complete within the
/// specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(AgriError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, AgriError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, AgriError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), AgriError::Timeout { .. }));
    }
}
