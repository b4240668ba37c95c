//! Per-request logging decorator.
//!
//! Emits exactly one structured log line per request with the resolved
//! status, error classification, and elapsed duration. The inner result is
//! returned unchanged.

use std::time::Instant;

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::http::request::ProxyRequest;
use crate::http::response::ProxyResponse;
use crate::middleware::Handler;

/// Logs the final outcome of the wrapped handler.
pub struct LoggingDecorator<H> {
    inner: H,
}

impl<H> LoggingDecorator<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: Handler> Handler for LoggingDecorator<H> {
    async fn call(&self, req: ProxyRequest) -> Result<ProxyResponse, ApiError> {
        let cx = req.cx.clone();
        let started = Instant::now();

        let result = self.inner.call(req).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => {
                tracing::info!(
                    method = %cx.method,
                    path = %cx.path,
                    status = response.status.as_u16(),
                    recorded = response.recorded,
                    duration_ms,
                    "request completed"
                );
            }
            // Classification only picks the log fields; the error itself
            // goes back unchanged.
            Err(error @ ApiError::Validation(fields)) => {
                tracing::info!(
                    method = %cx.method,
                    path = %cx.path,
                    status = error.status_code().as_u16(),
                    error_kind = error.kind(),
                    errors = ?fields,
                    duration_ms,
                    "request completed"
                );
            }
            Err(error @ ApiError::BadGateway { detail }) => {
                tracing::info!(
                    method = %cx.method,
                    path = %cx.path,
                    status = error.status_code().as_u16(),
                    error_kind = error.kind(),
                    error = %detail,
                    duration_ms,
                    "request completed"
                );
            }
            Err(error) => {
                tracing::info!(
                    method = %cx.method,
                    path = %cx.path,
                    status = error.status_code().as_u16(),
                    error_kind = error.kind(),
                    error = %error,
                    duration_ms,
                    "request completed"
                );
            }
        }

        result
    }
}
