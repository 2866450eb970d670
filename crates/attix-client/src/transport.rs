//! Shared request/response plumbing for the HTTP clients.

use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::retry::{retry_send, Resend};

/// Send an idempotent request, resending after any transport failure.
pub(crate) async fn send<F, Fut>(endpoint: &str, f: F) -> Result<reqwest::Response, ClientError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    send_with(endpoint, Resend::AnyTransportFailure, f).await
}

/// Send a request whose duplicate delivery would repeat its effect.
pub(crate) async fn send_unrepeatable<F, Fut>(
    endpoint: &str,
    f: F,
) -> Result<reqwest::Response, ClientError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    send_with(endpoint, Resend::ConnectFailureOnly, f).await
}

async fn send_with<F, Fut>(
    endpoint: &str,
    resend: Resend,
    f: F,
) -> Result<reqwest::Response, ClientError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    retry_send(endpoint, resend, f)
        .await
        .map_err(|e| ClientError::from_transport(endpoint, e))
}

/// Turn a non-2xx response into [`ClientError::Api`].
pub(crate) async fn check_status(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Api {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}

/// Decode a successful JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let resp = check_status(endpoint, resp).await?;
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ClientError::from_transport(endpoint, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Deserialization {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Join `path` onto `base`, tolerating a trailing slash on either side.
pub(crate) fn join(base: &url::Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
