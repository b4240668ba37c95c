//! Instrumentation decorators around the proxy handler.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → MetricsDecorator (outer)
//!     → LoggingDecorator (inner)
//!     → wrapped handler (proxy::Forwarder)
//!     → result flows back up through both decorators unchanged
//! ```
//!
//! # Design Decisions
//! - The order is fixed by `instrument` so both decorators observe the
//!   innermost result
//! - Decorators classify errors by matching the closed `ApiError` enum;
//!   they never swallow or replace what the inner call returned

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ApiError;
use crate::http::request::ProxyRequest;
use crate::http::response::ProxyResponse;
use crate::observability::ProxyMetrics;

pub mod logging;
pub mod metrics;

pub use logging::LoggingDecorator;
pub use metrics::MetricsDecorator;

/// A unit of the proxy handler chain.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: ProxyRequest) -> Result<ProxyResponse, ApiError>;
}

/// Wrap a handler in the fixed decorator order: metrics observe the
/// logging-wrapped handler, so both see the final result of the inner call.
pub fn instrument<H: Handler>(
    handler: H,
    metrics: Arc<ProxyMetrics>,
    name: &'static str,
) -> MetricsDecorator<LoggingDecorator<H>> {
    MetricsDecorator::new(LoggingDecorator::new(handler), metrics, name)
}
