//! HTTP client initialization.
//!
//! One client is shared by the PeeringDB, RIPE Atlas and Google Geocoding
//! clients.

use std::time::Duration;

use reqwest::ClientBuilder;

/// Initializes the HTTP client with default settings.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header naming this tool and its version
/// - Per-request timeout
/// - Rustls TLS backend (no native TLS)
///
/// # Arguments
///
/// * `timeout_seconds` - Per-request timeout
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(timeout_seconds: u64) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .use_rustls_tls()
        .build()
}
