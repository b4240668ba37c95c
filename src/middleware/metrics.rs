//! Per-request metrics decorator.
//!
//! Increments the request counter exactly once per call, classifies errors
//! into counter labels, and observes latency. The inner result is returned
//! unchanged.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::http::request::ProxyRequest;
use crate::http::response::ProxyResponse;
use crate::middleware::Handler;
use crate::observability::ProxyMetrics;

/// Records request/error/latency metrics for the wrapped handler.
pub struct MetricsDecorator<H> {
    inner: H,
    metrics: Arc<ProxyMetrics>,
    name: &'static str,
}

impl<H> MetricsDecorator<H> {
    pub fn new(inner: H, metrics: Arc<ProxyMetrics>, name: &'static str) -> Self {
        Self {
            inner,
            metrics,
            name,
        }
    }
}

#[async_trait]
impl<H: Handler> Handler for MetricsDecorator<H> {
    async fn call(&self, req: ProxyRequest) -> Result<ProxyResponse, ApiError> {
        let target = req.cx.target.clone();
        let started = Instant::now();

        let result = self.inner.call(req).await;

        let status = match &result {
            Ok(response) => {
                if !response.recorded {
                    self.metrics.record_unrecorded(self.name);
                }
                response.status.as_u16()
            }
            Err(error) => {
                self.metrics.record_error(self.name, &target, error.kind());
                error.status_code().as_u16()
            }
        };
        self.metrics.record_request(self.name, status, started.elapsed());

        result
    }
}
