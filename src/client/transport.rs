//! HTTP transport abstraction.
//!
//! The fetcher never talks to `reqwest` directly. Hosts that bring their own
//! HTTP stack implement [`Transport`]; everyone else uses [`ReqwestTransport`].

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::error::TransportError;

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Upper bound for the whole exchange, body included
    pub timeout: Duration,
}

/// A response that made it back, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Sends a single request. No retries.
///
/// Implementations report anything below HTTP (DNS, connect, TLS, timeout,
/// truncated body) as a [`TransportError`]. Non-2xx statuses are not errors
/// at this level.
pub trait Transport: Send + Sync {
    /// Send the request and read the full body.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`Transport`] over `reqwest` with request tracing.
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: ClientWithMiddleware,
}

impl ReqwestTransport {
    /// Create a transport with the default user agent.
    pub fn new() -> Self {
        Self::with_user_agent(&default_user_agent())
    }

    /// Create a transport with a custom user agent.
    pub fn with_user_agent(user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        let header_value = HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("ai-balance-client"));
        headers.insert(USER_AGENT, header_value);

        let reqwest_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Self { http_client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        let response = self
            .http_client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| match e {
                reqwest_middleware::Error::Reqwest(e) => classify(e, timeout),
                reqwest_middleware::Error::Middleware(e) => TransportError::Request(e.to_string()),
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| classify(e, timeout))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Default `User-Agent` header value.
pub fn default_user_agent() -> String {
    format!("ai-balance-client/{}", env!("CARGO_PKG_VERSION"))
}

// Signed URLs carry the access key id, so it stays out of error messages.
fn classify(error: reqwest::Error, timeout: Duration) -> TransportError {
    let error = error.without_url();
    if error.is_timeout() {
        TransportError::Timeout { after: timeout }
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
