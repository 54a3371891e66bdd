// crates/consul-itest-clients/src/http.rs
// ============================================================================
// Module: HTTP Plumbing
// Description: Shared reqwest client construction and response handling.
// Purpose: Apply TLS trust, timeouts, and status checks consistently.
// Dependencies: reqwest
// ============================================================================

use std::path::Path;
use std::time::Duration;

use consul_itest_core::ClientError;
use consul_itest_core::interfaces::Service;
use reqwest::Certificate;
use reqwest::Client;
use reqwest::Response;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// Request timeout applied to every HTTP adapter.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body excerpt kept in errors.
const BODY_EXCERPT_LIMIT: usize = 512;

/// Builds a client that trusts `ca_path` when the file exists.
///
/// A missing CA file falls back to the platform trust roots.
pub(crate) fn build_client(
    service: Service,
    ca_path: Option<&Path>,
    headers: HeaderMap,
) -> Result<Client, ClientError> {
    let mut builder = Client::builder().timeout(REQUEST_TIMEOUT).default_headers(headers);
    if let Some(path) = ca_path.filter(|path| path.is_file()) {
        let pem = std::fs::read(path).map_err(|err| ClientError::Setup {
            service,
            message: format!("failed to read CA bundle {}: {err}", path.display()),
        })?;
        let certificate = Certificate::from_pem(&pem).map_err(|err| ClientError::Setup {
            service,
            message: format!("invalid CA bundle {}: {err}", path.display()),
        })?;
        builder = builder.add_root_certificate(certificate);
    }
    builder.build().map_err(|err| ClientError::Setup {
        service,
        message: err.to_string(),
    })
}

/// Maps a reqwest failure to a transport error.
pub(crate) fn transport(service: Service) -> impl Fn(reqwest::Error) -> ClientError {
    move |err| ClientError::Transport {
        service,
        message: err.to_string(),
    }
}

/// Returns the response when its status is 200.
pub(crate) async fn expect_ok(
    service: Service,
    operation: &'static str,
    response: Response,
) -> Result<Response, ClientError> {
    let status = response.status().as_u16();
    if status == 200 {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::UnexpectedStatus {
        service,
        operation,
        status,
        body: excerpt(&body),
    })
}

/// Reads a 200 response body as text.
pub(crate) async fn ok_text(
    service: Service,
    operation: &'static str,
    response: Response,
) -> Result<String, ClientError> {
    expect_ok(service, operation, response).await?.text().await.map_err(transport(service))
}

/// Decodes a 200 response body as JSON.
pub(crate) async fn ok_json<T: DeserializeOwned>(
    service: Service,
    operation: &'static str,
    response: Response,
) -> Result<T, ClientError> {
    let body = ok_text(service, operation, response).await?;
    serde_json::from_str(&body).map_err(|err| ClientError::Decode {
        service,
        message: format!("{operation}: {err}"),
    })
}

/// Truncates a body for error messages.
fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_EXCERPT_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
