//! Retry strategy and HTTP error categorization.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::CollaboratorError;
use crate::config::{HTTP_STATUS_FORBIDDEN, HTTP_STATUS_UNAUTHORIZED};

/// Longest response body kept in error messages
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_ATTEMPTS`
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Maps a non-success HTTP status to a [`CollaboratorError`].
///
/// 401 and 403 mean the API key was refused, which no retry or later target
/// can fix.
pub fn categorize_status(service: &'static str, status: u16, body: &str) -> CollaboratorError {
    let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if status == HTTP_STATUS_UNAUTHORIZED || status == HTTP_STATUS_FORBIDDEN {
        CollaboratorError::Rejected {
            service,
            detail: format!("HTTP {}: {}", status, body),
        }
    } else {
        CollaboratorError::Status {
            service,
            status,
            body,
        }
    }
}
