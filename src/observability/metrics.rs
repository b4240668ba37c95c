//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the proxy's counters and latency histogram
//! - Render the Prometheus text exposition for `/metrics`
//!
//! # Metrics
//! - `proxy_requests_total{handler}`: one increment per completed request
//! - `proxy_request_duration_seconds{handler}`: latency distribution
//! - `proxy_errors_total{handler,target,kind}`: failed requests by kind
//! - `proxy_responses_total{status}`: responses by final status code
//! - `proxy_sessions_unrecorded_total{handler}`: responses delivered
//!   without a persisted session
//!
//! # Design Decisions
//! - One registry value constructed at startup and passed into every
//!   decorator instance; nothing registers through process-global state

use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Latency buckets in seconds.
const LATENCY_BUCKETS: &[f64] = &[0.1, 0.5, 5.0, 10.0, 30.0];

/// Metrics collectors for the proxy, bound to one explicit registry.
pub struct ProxyMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    errors_total: IntCounterVec,
    responses_total: IntCounterVec,
    sessions_unrecorded_total: IntCounterVec,
}

impl ProxyMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("proxy_requests_total", "Total requests processed"),
            &["handler"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "proxy_request_duration_seconds",
                "Request handling latency in seconds",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["handler"],
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new("proxy_errors_total", "Failed requests by error kind"),
            &["handler", "target", "kind"],
        )?;
        let responses_total = IntCounterVec::new(
            Opts::new("proxy_responses_total", "Responses by final status code"),
            &["status"],
        )?;
        let sessions_unrecorded_total = IntCounterVec::new(
            Opts::new(
                "proxy_sessions_unrecorded_total",
                "Responses delivered without a persisted session",
            ),
            &["handler"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(responses_total.clone()))?;
        registry.register(Box::new(sessions_unrecorded_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            errors_total,
            responses_total,
            sessions_unrecorded_total,
        })
    }

    /// Record one completed request with its final status and latency.
    pub fn record_request(&self, handler: &str, status: u16, elapsed: Duration) {
        self.requests_total.with_label_values(&[handler]).inc();
        self.request_duration
            .with_label_values(&[handler])
            .observe(elapsed.as_secs_f64());
        self.responses_total
            .with_label_values(&[status.to_string().as_str()])
            .inc();
    }

    /// Record a failed request by target and error kind.
    pub fn record_error(&self, handler: &str, target: &str, kind: &str) {
        self.errors_total
            .with_label_values(&[handler, target, kind])
            .inc();
    }

    /// Record a response delivered without a persisted session.
    pub fn record_unrecorded(&self, handler: &str) {
        self.sessions_unrecorded_total
            .with_label_values(&[handler])
            .inc();
    }

    /// Render the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or(());
        String::from_utf8(buffer).unwrap_or_default()
    }
}
