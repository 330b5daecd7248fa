//! Batch transport.
//!
//! [`Transport`] is the seam between the client and the network: one call,
//! one [`BatchRequest`] in, one raw [`BatchResponse`] out. [`HttpTransport`]
//! is the reqwest implementation used in production.

use async_trait::async_trait;
use log::{debug, warn};
use std::time::Instant;

use crate::{
    auth::AuthTokenProvider,
    error::TransportError,
    models::{BatchRequest, BatchResponse},
};

/// Sends one batch and returns the undecoded reply.
///
/// Implementations make exactly one attempt and must not swallow failures.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError>;
}

/// POSTs batches as JSON to a single endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    url: String,
    http_client: reqwest::Client,
    auth: AuthTokenProvider,
}

impl HttpTransport {
    pub(crate) fn new(url: String, http_client: reqwest::Client, auth: AuthTokenProvider) -> Self {
        Self {
            url,
            http_client,
            auth,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError> {
        let req_builder = self.auth.apply_to_request(self.http_client.post(&self.url).json(request));

        let start = Instant::now();
        debug!(
            "[BATCH_HTTP] Sending POST to {} (page={} lines={})",
            self.url, request.page_no, request.no_of_lines
        );

        let response = req_builder.send().await.map_err(|e| {
            warn!(
                "[BATCH_HTTP] Request failed: {} duration_ms={}",
                e,
                start.elapsed().as_millis()
            );
            TransportError::from_reqwest(e)
        })?;

        let status = response.status();
        let http_duration_ms = start.elapsed().as_millis();
        debug!(
            "[BATCH_HTTP] Response received: status={} duration_ms={}",
            status, http_duration_ms
        );

        let body = response.text().await.map_err(TransportError::from_reqwest)?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body
            };
            warn!(
                "[BATCH_HTTP] Server error: status={} message=\"{}\" duration_ms={}",
                status, message, http_duration_ms
            );
            return Err(TransportError::Status {
                status_code: status.as_u16(),
                message,
            });
        }

        let parse_start = Instant::now();
        let batch_response: BatchResponse =
            serde_json::from_str(&body).map_err(TransportError::MalformedResponse)?;
        debug!(
            "[BATCH_HTTP] Parsed {} entries: parse_ms={} total_ms={}",
            batch_response.len(),
            parse_start.elapsed().as_millis(),
            start.elapsed().as_millis()
        );

        Ok(batch_response)
    }
}
