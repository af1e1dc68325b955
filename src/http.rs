//! JSON over HTTP for the collaborator clients.

use log::debug;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio_retry::RetryIf;

use crate::error_handling::{categorize_status, get_retry_strategy, CollaboratorError};

/// Sends a request and decodes a JSON response body.
///
/// Non-success statuses are mapped through [`categorize_status`], undecodable
/// bodies become [`CollaboratorError::Malformed`].
pub async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &'static str,
) -> Result<T, CollaboratorError> {
    let response = request
        .send()
        .await
        .map_err(|source| CollaboratorError::Http { service, source })?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| CollaboratorError::Http { service, source })?;

    if !status.is_success() {
        return Err(categorize_status(service, status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| CollaboratorError::Malformed {
        service,
        detail: e.to_string(),
    })
}

/// GETs `url` and decodes the JSON body, retrying transient failures.
///
/// Only errors for which [`CollaboratorError::is_retriable`] holds are
/// retried, following [`get_retry_strategy`].
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    service: &'static str,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, CollaboratorError> {
    debug!("GET {} {:?}", url, query);
    RetryIf::spawn(
        get_retry_strategy(),
        || send_json(client.get(url).query(query), service),
        CollaboratorError::is_retriable,
    )
    .await
}
