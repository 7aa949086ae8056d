//! Retry policy for feed requests, with error classification.

use reqwest::StatusCode;

/// Maximum number of attempts for an idempotent feed request.
pub const MAX_RETRIES: usize = 3;

/// Delay between retry attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Errors that will not succeed on retry.
#[derive(Debug)]
pub enum NonRetryableError {
    /// HTTP 429, or 403 carrying a rate-limit message
    RateLimitExceeded(String),
    /// HTTP 401 — the feed rejected the API key
    AuthenticationFailed(String),
    /// HTTP 404
    NotFound(String),
    /// HTTP 403 other than rate limiting
    Forbidden(String),
    /// Remaining 4xx client errors
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded(msg) => {
                write!(f, "Feed rate limit exceeded: {}. Try again later.", msg)
            }
            NonRetryableError::AuthenticationFailed(msg) => {
                write!(f, "Authentication failed: {}. Check the API key.", msg)
            }
            NonRetryableError::NotFound(msg) => {
                write!(f, "Not found: {}", msg)
            }
            NonRetryableError::Forbidden(msg) => {
                write!(
                    f,
                    "Access forbidden: {}. The API key may lack permissions.",
                    msg
                )
            }
            NonRetryableError::ClientError(msg) => {
                write!(f, "Request error: {}", msg)
            }
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies a transport error. Returns Ok(()) when retrying makes sense,
/// Err with a user-facing message when it does not.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    if let Some(status) = error.status() {
        match status {
            StatusCode::UNAUTHORIZED => {
                return Err(NonRetryableError::AuthenticationFailed(
                    "the feed rejected the credentials".to_string(),
                ));
            }
            StatusCode::FORBIDDEN => {
                let msg = error.to_string();
                if msg.contains("rate limit") {
                    return Err(NonRetryableError::RateLimitExceeded(
                        "feed rate limit exceeded".to_string(),
                    ));
                }
                return Err(NonRetryableError::Forbidden(
                    "access to this resource is forbidden".to_string(),
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(NonRetryableError::RateLimitExceeded(
                    "too many requests".to_string(),
                ));
            }
            StatusCode::NOT_FOUND => {
                return Err(NonRetryableError::NotFound(
                    "the requested resource was not found".to_string(),
                ));
            }
            // Other 4xx responses will not change on retry
            s if s.is_client_error() => {
                return Err(NonRetryableError::ClientError(format!(
                    "HTTP {} error",
                    s.as_u16()
                )));
            }
            // 5xx responses are retryable
            _ => {}
        }
    }

    // Connection failures, timeouts and the like are retryable
    Ok(())
}

/// Maps an `error_for_status()` failure: retryable errors pass through,
/// non-retryable ones become a [`NonRetryableError`].
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
